use std::collections::HashSet;
use std::rc::Rc;

use test_log::test;

use logic_fuzz::builder::Builder;
use logic_fuzz::formula::{Formula, FormulaRef};
use logic_fuzz::fuzzer::{check_canonical_children, FuzzConfig, Fuzzer};
use logic_fuzz::random::Random;
use logic_fuzz::sink::SilentSink;

const VARS: i32 = 4;

/// Build a random formula over `VARS` variables, reusing earlier subformulas
/// so that the result is a DAG with sharing and duplicate children.
fn random_formula(builder: &Builder, rand: &mut Random, pool: &mut Vec<FormulaRef>, depth: u32) -> FormulaRef {
    let choice = if depth == 0 { rand.pick_int(0, 2) } else { rand.pick_int(0, 6) };
    let formula = match choice {
        0 => builder.make_constant(rand.generate_bool()),
        1 | 2 => {
            let v = rand.pick_int(1, VARS);
            builder.make_variable(if rand.generate_bool() { v } else { -v })
        }
        3 if !pool.is_empty() => {
            let pos = rand.pick_int(0, pool.len() as i32 - 1);
            pool[pos as usize].clone()
        }
        _ => {
            let n = rand.pick_int(0, 4);
            let children = (0..n)
                .map(|_| random_formula(builder, rand, pool, depth - 1))
                .collect();
            if rand.generate_bool() {
                builder.make_conjunction(children)
            } else {
                builder.make_disjunction(children)
            }
        }
    };
    pool.push(formula.clone());
    formula
}

fn all_models() -> Vec<Vec<bool>> {
    (0..1u32 << VARS)
        .map(|bits| (0..VARS).map(|i| bits & (1 << i) != 0).collect())
        .collect()
}

fn assert_equivalent(f: &Formula, g: &Formula) {
    for model in all_models() {
        assert_eq!(f.evaluate(&model), g.evaluate(&model), "{} vs {} under {:?}", f, g, model);
    }
}

/// Check the canonical-children invariant on every gate reachable from `f`.
fn assert_canonical(f: &FormulaRef) {
    let mut stack = vec![f.clone()];
    let mut visited = HashSet::new();
    while let Some(node) = stack.pop() {
        if !visited.insert(Rc::as_ptr(&node)) {
            continue;
        }
        assert!(check_canonical_children(&node).is_none(), "not canonical: {}", node);
        if node.as_gate().is_some() {
            assert!(node.arity() >= 2, "degenerate gate: {}", node);
        }
        stack.extend(node.children().iter().cloned());
    }
}

#[test]
fn test_end_to_end_scenarios() {
    let builder = Builder::default();
    let x1 = builder.make_variable(1);
    let x2 = builder.make_variable(2);

    let f = builder.make_conjunction(vec![x1.clone(), x2.clone(), builder.make_true()]);
    let s = builder.simplify(&f);
    assert_eq!(s.arity(), 2);
    assert_eq!(s, builder.make_conjunction(vec![x1.clone(), x2.clone()]));

    let f = builder.make_conjunction(vec![builder.make_variable(5)]);
    assert_eq!(*builder.simplify(&f), Formula::Variable(5));

    let f = builder.make_disjunction(vec![]);
    assert_eq!(*builder.simplify(&f), Formula::Constant(false));

    let f = builder.make_conjunction(vec![x1.clone(), builder.make_false(), x2.clone()]);
    assert_eq!(*builder.simplify(&f), Formula::Constant(false));

    let f = builder.make_conjunction(vec![x1, x2]);
    assert_eq!(f.to_string(), "AND[x1, x2]");
}

#[test]
fn test_identity_laws() {
    let builder = Builder::default();
    assert_eq!(*builder.simplify(&builder.make_conjunction(vec![])), Formula::Constant(true));
    assert_eq!(*builder.simplify(&builder.make_disjunction(vec![])), Formula::Constant(false));

    let g = builder.make_disjunction(vec![builder.make_variable(1), builder.make_variable(-2)]);
    assert_eq!(builder.simplify(&builder.make_conjunction(vec![g.clone()])), g);
    assert_eq!(builder.simplify(&builder.make_disjunction(vec![g.clone()])), g);
}

#[test]
fn test_out_of_range_literal() {
    let builder = Builder::default();
    let x = builder.make_variable(9);
    let not_x = builder.make_variable(-9);
    for model in all_models() {
        assert!(!builder.evaluate(&x, &model));
        assert!(!builder.evaluate(&not_x, &model));
    }
}

#[test]
fn test_rewrites_preserve_semantics() {
    let mut rand = Random::new(2025);
    for _ in 0..200 {
        let builder = Builder::default();
        let mut pool = Vec::new();
        let f = random_formula(&builder, &mut rand, &mut pool, 4);

        let n = builder.normalize(&f);
        let s = builder.simplify(&f);
        assert_equivalent(&f, &n);
        assert_equivalent(&f, &s);
        assert_canonical(&n);
        assert_canonical(&s);
        assert_eq!(n, s);
    }
}

#[test]
fn test_rewrites_are_idempotent() {
    let mut rand = Random::new(7);
    let builder = Builder::default();
    let mut pool = Vec::new();
    for _ in 0..200 {
        let f = random_formula(&builder, &mut rand, &mut pool, 3);

        let once = builder.normalize(&f);
        let twice = builder.normalize(&once);
        assert!(Rc::ptr_eq(&once, &twice), "{} vs {}", once, twice);

        let once = builder.simplify(&f);
        let twice = builder.simplify(&once);
        assert!(Rc::ptr_eq(&once, &twice), "{} vs {}", once, twice);
    }
}

#[test]
fn test_hash_consing_across_inputs() {
    let mut rand = Random::new(31337);
    let builder = Builder::default();
    let mut pool = Vec::new();
    let mut seen: Vec<FormulaRef> = Vec::new();
    for _ in 0..300 {
        let f = random_formula(&builder, &mut rand, &mut pool, 3);
        let s = builder.simplify(&f);
        for other in &seen {
            assert_eq!(Rc::ptr_eq(other, &s), **other == *s, "{} vs {}", other, s);
        }
        seen.push(s);
    }
}

/// `f = OR[f, x_{3+i}, f]`, repeated `levels` times: a DAG of `2 * levels + 3`
/// nodes whose tree size is exponential in `levels`.
fn tower(builder: &Builder, levels: i32) -> FormulaRef {
    let mut f = builder.make_conjunction(vec![builder.make_variable(1), builder.make_variable(2)]);
    for i in 0..levels {
        f = builder.make_disjunction(vec![f.clone(), builder.make_variable(3 + i), f]);
    }
    f
}

#[test]
fn test_simplify_independently_built_towers() {
    let builder = Builder::default();
    let a = tower(&builder, 60);
    let b = tower(&builder, 60);
    assert!(!Rc::ptr_eq(&a, &b));
    assert_eq!(a.dag_size(), 123);

    let sa = builder.simplify(&a);
    let sb = builder.simplify(&b);
    assert!(Rc::ptr_eq(&sa, &sb));
    // One hit per level for the repeated child, then one for `b` itself.
    assert_eq!(builder.cache_stats().hits, 60 + 1);
    assert_eq!(sa.depth(), 61);
    assert_eq!(sa.dag_size(), 123);

    assert_eq!(builder.normalize(&b), sa);
}

#[test]
fn test_rewrites_do_not_modify_input() {
    let mut rand = Random::new(4242);
    let builder = Builder::default();
    let mut pool = Vec::new();
    for _ in 0..100 {
        let f = random_formula(&builder, &mut rand, &mut pool, 4);
        let before = f.to_string();
        builder.normalize(&f);
        builder.simplify(&f);
        assert_eq!(f.to_string(), before);
    }
}

#[test]
fn test_generator_reproducible() {
    let mut a = Random::new(0x1234_5678_9abc_def0);
    let mut b = Random::new(0x1234_5678_9abc_def0);
    for i in 0..500 {
        assert_eq!(a.pick_int(0, i), b.pick_int(0, i));
        assert_eq!(a.generate_bool(), b.generate_bool());
    }
}

#[test]
fn test_fuzzer_tally_mode() {
    let config = FuzzConfig {
        seed: 12345,
        iterations: 500,
        max_models: 100,
        fail_fast: false,
        ..FuzzConfig::default()
    };
    let mut fuzzer = Fuzzer::new(config, SilentSink);
    let summary = fuzzer.run().unwrap();
    assert_eq!(summary.errors, 0);
    assert_eq!(fuzzer.errors(), 0);
    assert!(summary.simplified > 0 && summary.normalized > 0 && summary.grown > 0);
}
