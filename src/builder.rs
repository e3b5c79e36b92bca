//! Formula builder and rewriting engine.
//!
//! All formulas are created through a [`Builder`]. Its smart constructors fold
//! constants as they go, and it provides two rewrites:
//!
//! - [`normalize`][Builder::normalize]: removes duplicate children and
//!   constants from every gate, rebuilding only the gates that change;
//! - [`simplify`][Builder::simplify]: the same canonical form, memoized across
//!   calls and hash-consed, so that structurally equal results are the very same
//!   [`FormulaRef`].
//!
//! A builder uses interior mutability for its cache and is not `Sync`; share it
//! between threads only behind external synchronization.
//!
//! ```
//! use logic_fuzz::builder::Builder;
//!
//! let builder = Builder::default();
//! let x1 = builder.make_variable(1);
//! let x2 = builder.make_variable(2);
//! let f = builder.make_conjunction(vec![x1.clone(), x2.clone(), x1]);
//! assert_eq!(f.to_string(), "AND[x1, x2, x1]");
//!
//! let g = builder.simplify(&f);
//! assert_eq!(g.to_string(), "AND[x1, x2]");
//! assert!(std::rc::Rc::ptr_eq(&g, &builder.simplify(&g)));
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::rc::Rc;

use log::debug;

use crate::cache::{CacheStats, SimplifyCache};
use crate::formula::{Formula, FormulaRef, GateKind};

#[derive(Default)]
pub struct Builder {
    cache: RefCell<SimplifyCache>,
}

impl Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.borrow();
        f.debug_struct("Builder")
            .field("memo", &cache.len())
            .field("unique", &cache.unique_len())
            .finish()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    /// Forget all memoized simplifications and hash-consed representatives.
    pub fn clear_cache(&self) {
        debug!("clear_cache: {}", self.cache_stats());
        self.cache.borrow_mut().clear();
    }

    pub fn evaluate(&self, formula: &Formula, model: &[bool]) -> bool {
        formula.evaluate(model)
    }
}

// Constructors
impl Builder {
    pub fn make_true(&self) -> FormulaRef {
        self.make_constant(true)
    }

    pub fn make_false(&self) -> FormulaRef {
        self.make_constant(false)
    }

    pub fn make_constant(&self, value: bool) -> FormulaRef {
        Rc::new(Formula::Constant(value))
    }

    pub fn make_variable(&self, literal: i32) -> FormulaRef {
        assert_ne!(literal, 0, "Literal should not be zero");
        Rc::new(Formula::Variable(literal))
    }

    pub fn make_conjunction(&self, children: Vec<FormulaRef>) -> FormulaRef {
        self.make_gate(GateKind::And, children)
    }

    pub fn make_disjunction(&self, children: Vec<FormulaRef>) -> FormulaRef {
        self.make_gate(GateKind::Or, children)
    }

    /// Build a gate, folding constants:
    ///
    /// ```text
    /// AND[]           => True
    /// AND[.., F, ..]  => False
    /// AND[.., T, ..]  => AND[..]
    /// AND[x]          => x
    /// ```
    ///
    /// and dually for OR. Duplicate children are kept.
    pub fn make_gate(&self, kind: GateKind, mut children: Vec<FormulaRef>) -> FormulaRef {
        debug!("make_gate(kind = {}, arity = {})", kind, children.len());

        if children.is_empty() {
            return self.make_constant(kind.identity());
        }
        if children.iter().any(|c| c.as_constant() == Some(kind.absorbing())) {
            debug!("make_gate: absorbing constant");
            return self.make_constant(kind.absorbing());
        }
        children.retain(|c| !c.is_constant());
        match children.len() {
            0 => self.make_constant(kind.identity()),
            1 => children.swap_remove(0),
            _ => Rc::new(Formula::new_gate(kind, children)),
        }
    }
}

// Normalization
impl Builder {
    /// Rewrite every gate so that it has no constant and no duplicate children,
    /// collapsing gates left with fewer than two children.
    ///
    /// The input is left untouched: changed gates are rebuilt bottom-up, and a
    /// gate whose children all survive as-is is returned as the same handle.
    /// A subformula shared inside `formula` is normalized once.
    pub fn normalize(&self, formula: &FormulaRef) -> FormulaRef {
        let mut visited = HashMap::new();
        self.normalize_rec(formula, &mut visited)
    }

    fn normalize_rec(
        &self,
        formula: &FormulaRef,
        visited: &mut HashMap<*const Formula, FormulaRef>,
    ) -> FormulaRef {
        let Some(gate) = formula.as_gate() else {
            return formula.clone();
        };
        if let Some(result) = visited.get(&Rc::as_ptr(formula)) {
            return result.clone();
        }

        let kind = gate.kind();
        let mut seen = HashSet::new();
        let mut children = Vec::with_capacity(gate.arity());
        for child in gate.children() {
            let child = self.normalize_rec(child, visited);
            if seen.insert(child.clone()) {
                children.push(child);
            }
        }

        let result = if children.iter().any(|c| c.as_constant() == Some(kind.absorbing())) {
            debug!("normalize: {} collapses to {}", kind, kind.absorbing());
            self.make_constant(kind.absorbing())
        } else {
            children.retain(|c| !c.is_constant());
            match children.len() {
                0 => self.make_constant(kind.identity()),
                1 => children.swap_remove(0),
                n if n == gate.arity()
                    && children
                        .iter()
                        .zip(gate.children())
                        .all(|(new, old)| Rc::ptr_eq(new, old)) =>
                {
                    formula.clone()
                }
                _ => Rc::new(Formula::new_gate(kind, children)),
            }
        };

        visited.insert(Rc::as_ptr(formula), result.clone());
        result
    }
}

// Simplification
impl Builder {
    /// Canonicalize `formula`.
    ///
    /// The result has the same normal form as [`normalize`][Self::normalize]
    /// produces, but it is also hash-consed: until the next
    /// [`clear_cache`][Self::clear_cache], every call returning a structurally
    /// equal result returns the same handle. Results are memoized by the
    /// structure of the input.
    pub fn simplify(&self, formula: &FormulaRef) -> FormulaRef {
        let cached = self.cache.borrow_mut().get(formula);
        if let Some(result) = cached {
            return result;
        }

        let result = match formula.as_ref() {
            Formula::Constant(_) | Formula::Variable(_) => self.intern(formula.clone()),
            Formula::Gate(gate) => {
                let children = gate.children().iter().map(|c| self.simplify(c)).collect();
                self.simplify_gate(gate.kind(), children)
            }
        };
        debug!("simplify(arity = {}) => arity {}", formula.arity(), result.arity());

        self.cache.borrow_mut().insert(formula.clone(), result.clone());
        result
    }

    /// Fold a gate over already simplified (hence interned) children.
    fn simplify_gate(&self, kind: GateKind, mut children: Vec<FormulaRef>) -> FormulaRef {
        if children.is_empty() {
            return self.intern_constant(kind.identity());
        }
        if children.len() == 1 {
            return children.swap_remove(0);
        }
        if children.iter().any(|c| c.as_constant() == Some(kind.absorbing())) {
            return self.intern_constant(kind.absorbing());
        }

        children.retain(|c| !c.is_constant());
        match children.len() {
            0 => return self.intern_constant(kind.identity()),
            1 => return children.swap_remove(0),
            _ => {}
        }

        let mut seen = HashSet::new();
        children.retain(|c| seen.insert(c.clone()));
        if children.len() == 1 {
            return children.swap_remove(0);
        }

        self.intern(Rc::new(Formula::new_gate(kind, children)))
    }

    fn intern(&self, formula: FormulaRef) -> FormulaRef {
        self.cache.borrow_mut().intern(formula)
    }

    fn intern_constant(&self, value: bool) -> FormulaRef {
        self.intern(self.make_constant(value))
    }
}
