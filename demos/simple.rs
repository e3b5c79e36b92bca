use logic_fuzz::builder::Builder;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let builder = Builder::default();
    println!("builder = {:?}", builder);

    let x1 = builder.make_variable(1);
    let x2 = builder.make_variable(2);
    let args = vec![x1.clone(), x2, builder.make_true()];

    let g = builder.make_conjunction(args);
    assert!(g != x1);
    println!("g = {}", g);

    // g = x1 AND x2 AND True, satisfied when both variables are true.
    let model = [true, true, true, true];
    println!("model = {:?}", model);
    println!("Evaluation result: {}", builder.evaluate(&g, &model));

    let h = builder.simplify(&g);
    println!("h = {}", h);
    assert_eq!(h.arity(), 2);

    println!("builder = {:?}", builder);
    println!("cache: {}", builder.cache_stats());

    Ok(())
}
