//! Differential fuzzing of the rewriting engine.
//!
//! The fuzzer keeps a pool of live formulas and drives it as a small state
//! machine, one [`Step`] per iteration:
//!
//! - [`Step::Grow`] adds a new formula built from pool members;
//! - [`Step::Normalize`] and [`Step::Simplify`] rewrite a pool member, check the
//!   result against the original on random models, and add it to the pool;
//! - [`Step::Reset`] starts a new round: empty pool, fresh cache, new round seed.
//!
//! All choices come from one [`Random`] stream. The generator state at the
//! start of a round is recorded, so a divergence can be replayed by starting a
//! fresh fuzzer from [`Divergence::seed`].

use std::collections::HashSet;
use std::fmt;

use log::{debug, info, warn};

use crate::builder::Builder;
use crate::formula::{Formula, FormulaRef};
use crate::random::Random;
use crate::sink::Sink;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FuzzConfig {
    /// Seed of the first round.
    pub seed: u64,
    /// Number of steps to run.
    pub iterations: usize,
    /// Highest variable index used in formulas. Models cover one more slot, so
    /// out-of-range literals are never produced.
    pub num_literals: i32,
    /// Stop at the first divergence instead of counting them.
    pub fail_fast: bool,
    /// Narrate every step to the sink.
    pub verbose: bool,
    /// Pool size at the start of every round.
    pub prepopulate: usize,
    /// Maximal number of children of a grown gate.
    pub max_children: i32,
    /// Maximal number of random models per comparison.
    pub max_models: i32,
    /// Chance, in percent, that a reset draw actually resets.
    pub reset_percent: i32,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            iterations: 1000,
            num_literals: 20,
            fail_fast: true,
            verbose: false,
            prepopulate: 10,
            max_children: 6,
            max_models: 10000,
            reset_percent: 10,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Step {
    Grow,
    Normalize,
    Simplify,
    Reset,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Grow => write!(f, "grow"),
            Step::Normalize => write!(f, "normalize"),
            Step::Simplify => write!(f, "simplify"),
            Step::Reset => write!(f, "reset"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DivergenceKind {
    /// The rewritten formula evaluates differently from the original.
    Mismatch {
        step: Step,
        original: FormulaRef,
        rewritten: FormulaRef,
        model: Vec<bool>,
        expected: bool,
        actual: bool,
    },
    /// A simplified gate kept a constant child.
    ConstantChild { formula: FormulaRef },
    /// A simplified gate kept two structurally equal children.
    DuplicateChildren { formula: FormulaRef },
}

#[derive(Debug, Clone)]
pub struct Divergence {
    /// Seed of the round in which the divergence was found.
    pub seed: u64,
    pub kind: DivergenceKind,
}

/// Render a model as the list of literals it makes true.
fn format_model(model: &[bool]) -> String {
    model
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let v = i as i64 + 1;
            if value {
                v.to_string()
            } else {
                (-v).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DivergenceKind::Mismatch {
                step,
                original,
                rewritten,
                model,
                expected,
                actual,
            } => {
                writeln!(f, "{} changed the value of a formula", step)?;
                writeln!(f, "original (val: {})\n\t{}", expected, original)?;
                writeln!(f, "rewritten (val: {})\n\t{}", actual, rewritten)?;
                writeln!(f, "model: {}", format_model(model))?;
            }
            DivergenceKind::ConstantChild { formula } => {
                writeln!(f, "constant among the children of a simplified gate\n\t{}", formula)?;
            }
            DivergenceKind::DuplicateChildren { formula } => {
                writeln!(f, "duplicate children in a simplified gate\n\t{}", formula)?;
            }
        }
        write!(f, "rerun with the following seed as start point {}", self.seed)
    }
}

impl std::error::Error for Divergence {}

/// Check that `formula`'s direct children contain no constant and no two
/// structurally equal formulas.
pub fn check_canonical_children(formula: &FormulaRef) -> Option<DivergenceKind> {
    let children = formula.children();
    if children.iter().any(|c| c.is_constant()) {
        return Some(DivergenceKind::ConstantChild {
            formula: formula.clone(),
        });
    }
    let mut seen: HashSet<&Formula> = HashSet::with_capacity(children.len());
    if !children.iter().all(|c| seen.insert(c.as_ref())) {
        return Some(DivergenceKind::DuplicateChildren {
            formula: formula.clone(),
        });
    }
    None
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct FuzzSummary {
    pub iterations: usize,
    pub errors: usize,
    pub grown: usize,
    pub normalized: usize,
    pub simplified: usize,
    pub resets: usize,
    pub skipped: usize,
}

impl fmt::Display for FuzzSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "errors: {} from {} (grow={}, normalize={}, simplify={}, reset={}, skip={})",
            self.errors,
            self.iterations,
            self.grown,
            self.normalized,
            self.simplified,
            self.resets,
            self.skipped
        )
    }
}

/// A rewrite exercised by the fuzzer.
pub type Rewrite = fn(&Builder, &FormulaRef) -> FormulaRef;

pub struct Fuzzer<S: Sink> {
    config: FuzzConfig,
    rand: Random,
    builder: Builder,
    normalize: Rewrite,
    simplify: Rewrite,
    pool: Vec<FormulaRef>,
    round_seed: u64,
    summary: FuzzSummary,
    sink: S,
}

impl<S: Sink> fmt::Debug for Fuzzer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fuzzer")
            .field("seed", &self.rand.seed())
            .field("round_seed", &self.round_seed)
            .field("pool", &self.pool.len())
            .field("builder", &self.builder)
            .finish()
    }
}

impl<S: Sink> Fuzzer<S> {
    pub fn new(config: FuzzConfig, sink: S) -> Self {
        assert!(config.num_literals >= 1, "Need at least one literal");
        assert!(config.prepopulate >= 1, "The pool must never be empty");

        let mut fuzzer = Self {
            rand: Random::new(config.seed),
            round_seed: config.seed,
            config,
            builder: Builder::default(),
            normalize: Builder::normalize,
            simplify: Builder::simplify,
            pool: Vec::new(),
            summary: FuzzSummary::default(),
            sink,
        };
        fuzzer.prepopulate();
        fuzzer
    }

    /// Exercise `rewrite` in [`Step::Normalize`] instead of [`Builder::normalize`].
    pub fn with_normalize(mut self, rewrite: Rewrite) -> Self {
        self.normalize = rewrite;
        self
    }

    /// Exercise `rewrite` in [`Step::Simplify`] instead of [`Builder::simplify`].
    pub fn with_simplify(mut self, rewrite: Rewrite) -> Self {
        self.simplify = rewrite;
        self
    }

    pub fn config(&self) -> &FuzzConfig {
        &self.config
    }

    pub fn pool(&self) -> &[FormulaRef] {
        &self.pool
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Seed that replays the current round from its start.
    pub fn round_seed(&self) -> u64 {
        self.round_seed
    }

    pub fn errors(&self) -> usize {
        self.summary.errors
    }

    pub fn summary(&self) -> &FuzzSummary {
        &self.summary
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn narrate(&mut self, line: impl FnOnce() -> String) {
        if self.config.verbose {
            self.sink.record(&line());
        }
    }

    fn random_literal(&mut self) -> i32 {
        self.rand.pick_int(1, self.config.num_literals)
    }

    /// Fill the pool with constants and literals of both polarities.
    fn prepopulate(&mut self) {
        for _ in 0..self.config.prepopulate {
            let formula = match self.rand.pick_int(0, 5) {
                0 => self.builder.make_true(),
                1 => self.builder.make_false(),
                _ => {
                    let v = self.random_literal();
                    let literal = if self.rand.generate_bool() { v } else { -v };
                    self.builder.make_variable(literal)
                }
            };
            self.pool.push(formula);
        }
    }

    fn pick_from_pool(&mut self) -> FormulaRef {
        assert!(!self.pool.is_empty(), "The pool must never be empty");
        let pos = self.rand.pick_int(0, self.pool.len() as i32 - 1);
        self.pool[pos as usize].clone()
    }

    fn pick_children(&mut self) -> Vec<FormulaRef> {
        let n = self.rand.pick_int(0, self.config.max_children);
        (0..n).map(|_| self.pick_from_pool()).collect()
    }

    fn generate_model(&mut self, model: &mut Vec<bool>) {
        model.clear();
        for _ in 0..=self.config.num_literals {
            model.push(self.rand.generate_bool());
        }
    }

    /// Evaluate both formulas on a random number of random models.
    pub fn compare_models(
        &mut self,
        step: Step,
        original: &FormulaRef,
        rewritten: &FormulaRef,
    ) -> Result<(), Divergence> {
        let n = self.rand.pick_int(0, self.config.max_models);
        let mut model = Vec::with_capacity(self.config.num_literals as usize + 1);
        for _ in 0..n {
            self.generate_model(&mut model);
            let expected = self.builder.evaluate(original, &model);
            let actual = self.builder.evaluate(rewritten, &model);
            if expected != actual {
                return Err(Divergence {
                    seed: self.round_seed,
                    kind: DivergenceKind::Mismatch {
                        step,
                        original: original.clone(),
                        rewritten: rewritten.clone(),
                        model,
                        expected,
                        actual,
                    },
                });
            }
        }
        Ok(())
    }

    /// Draw the next step. `None` is a reset draw that did not fire.
    pub fn choose_step(&mut self) -> Option<Step> {
        match self.rand.pick_int(0, 3) {
            0 => Some(Step::Grow),
            1 => Some(Step::Normalize),
            2 => Some(Step::Simplify),
            _ => {
                if self.rand.pick_int(0, 100) < self.config.reset_percent {
                    Some(Step::Reset)
                } else {
                    None
                }
            }
        }
    }

    pub fn execute(&mut self, step: Step) -> Result<(), Divergence> {
        debug!("execute: {} (pool = {})", step, self.pool.len());
        match step {
            Step::Grow => {
                self.summary.grown += 1;
                self.grow();
                Ok(())
            }
            Step::Normalize => {
                self.summary.normalized += 1;
                self.test_normalize()
            }
            Step::Simplify => {
                self.summary.simplified += 1;
                self.test_simplify()
            }
            Step::Reset => {
                self.summary.resets += 1;
                self.reset();
                Ok(())
            }
        }
    }

    fn grow(&mut self) {
        let (kind, formula) = match self.rand.pick_int(0, 5) {
            0 => ("true", self.builder.make_true()),
            1 => ("false", self.builder.make_false()),
            2 => {
                let children = self.pick_children();
                ("and", self.builder.make_conjunction(children))
            }
            3 => {
                let children = self.pick_children();
                ("or", self.builder.make_disjunction(children))
            }
            _ => {
                let literal = self.random_literal();
                ("literal", self.builder.make_variable(literal))
            }
        };
        self.narrate(|| format!("produce new node {}", kind));
        self.pool.push(formula);
    }

    fn test_normalize(&mut self) -> Result<(), Divergence> {
        self.narrate(|| "test normalize".to_string());
        let original = self.pick_from_pool();
        let normalized = (self.normalize)(&self.builder, &original);
        self.pool.push(normalized.clone());
        self.compare_models(Step::Normalize, &original, &normalized)
    }

    fn test_simplify(&mut self) -> Result<(), Divergence> {
        let original = self.pick_from_pool();
        let simplified = (self.simplify)(&self.builder, &original);
        self.narrate(|| {
            format!(
                "test simplify\t{}\nafter simplification\t{}",
                original, simplified
            )
        });
        self.pool.push(simplified.clone());

        self.compare_models(Step::Simplify, &original, &simplified)?;
        match check_canonical_children(&simplified) {
            Some(kind) => Err(Divergence {
                seed: self.round_seed,
                kind,
            }),
            None => Ok(()),
        }
    }

    /// Start a new round from the current generator state.
    fn reset(&mut self) {
        self.narrate(|| "emptying cache".to_string());
        self.pool.clear();
        self.round_seed = self.rand.seed();
        info!("New round with seed {}", self.round_seed);
        self.prepopulate();
        self.builder.clear_cache();
    }

    /// Run the configured number of steps.
    ///
    /// With `fail_fast`, the first divergence is returned as an error. Otherwise
    /// divergences are logged, counted in the summary, and the run goes on.
    pub fn run(&mut self) -> Result<FuzzSummary, Divergence> {
        info!(
            "Fuzzing {} steps from seed {} with {} literals",
            self.config.iterations, self.config.seed, self.config.num_literals
        );

        for i in 0..self.config.iterations {
            if i % 100 == 0 {
                info!("...{}", i);
            }
            self.summary.iterations += 1;

            let Some(step) = self.choose_step() else {
                self.summary.skipped += 1;
                continue;
            };
            if let Err(divergence) = self.execute(step) {
                self.summary.errors += 1;
                if self.config.fail_fast {
                    return Err(divergence);
                }
                warn!("{}", divergence);
            }
        }

        info!("{}", self.summary);
        info!("Simplifier cache: {}", self.builder.cache_stats());
        Ok(self.summary.clone())
    }
}
