use clap::{Parser, ValueEnum};
use log::info;

use logic_fuzz::fuzzer::{FuzzConfig, Fuzzer};
use logic_fuzz::invocation::{Invocation, SeedOrigin};
use logic_fuzz::sink::SinkKind;

#[derive(Debug, Copy, Clone, ValueEnum)]
enum SinkArg {
    Silent,
    Stdout,
    File,
}

impl From<SinkArg> for SinkKind {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::Silent => SinkKind::Silent,
            SinkArg::Stdout => SinkKind::Stdout,
            SinkArg::File => SinkKind::File,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// `SEED`, `SEED COUNT`, `ACCOUNT COUNT` or `SEED COUNT VERBOSE`.
    /// Without arguments, the seed and count are derived from the clock.
    #[arg(value_name = "ARGS", num_args = 0..)]
    args: Vec<String>,

    /// Where the step narration goes (default: stdout when verbose, silent otherwise).
    #[clap(long, value_enum)]
    sink: Option<SinkArg>,

    /// Highest variable index used in formulas.
    #[clap(
        long,
        value_name = "INT",
        default_value = "20",
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    literals: i32,

    /// Count divergences and keep going instead of aborting on the first one.
    #[clap(long)]
    tally: bool,

    /// Log level.
    #[clap(long, value_name = "LEVEL", default_value = "info")]
    log_level: simplelog::LevelFilter,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let invocation = Invocation::from_args(args.args.as_slice())?;
    if invocation.origin == SeedOrigin::Clock {
        println!("generating new seed based on the time!");
    }
    println!("using as seed {}", invocation.seed);
    println!("testing {} values", invocation.count);

    let sink = match args.sink {
        Some(arg) => SinkKind::from(arg),
        None if invocation.verbose => SinkKind::Stdout,
        None => SinkKind::Silent,
    };

    let config = FuzzConfig {
        seed: invocation.seed,
        iterations: invocation.count,
        num_literals: args.literals,
        fail_fast: !args.tally,
        verbose: invocation.verbose,
        ..FuzzConfig::default()
    };

    let time_total = std::time::Instant::now();
    let mut fuzzer = Fuzzer::new(config, sink.create());
    match fuzzer.run() {
        Ok(summary) => {
            if args.tally {
                println!("\n\nerrors: {} from {}", summary.errors, summary.iterations);
            }
            let time_total = time_total.elapsed();
            info!("Done in {:.3} s", time_total.as_secs_f64());
            Ok(())
        }
        Err(divergence) => {
            eprintln!("\nERROR, {}", divergence);
            std::process::abort();
        }
    }
}
