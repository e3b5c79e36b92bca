//! # logic-fuzz: canonicalizing rewrites of AND/OR formulas
//!
//! **`logic-fuzz`** builds propositional formulas out of constants, literals and
//! n-ary AND/OR gates, rewrites them into a canonical form, and checks with a
//! differential fuzzer that the rewrites never change what a formula means.
//!
//! ## Formulas
//!
//! A formula is a DAG of immutable, reference-counted nodes
//! ([`FormulaRef`][crate::formula::FormulaRef]). Equality and hashing are
//! structural, and gate children are ordered.
//!
//! ## Builder-Centric Architecture
//!
//! All formulas are made by a [`Builder`][crate::builder::Builder]:
//!
//! - **Smart constructors** fold constants on the fly (`AND[x, True] = x`,
//!   `OR[x, True] = True`, `AND[] = True`, ...).
//! - **Normalization** rebuilds a formula without constant or duplicate
//!   children. The input is never modified.
//! - **Simplification** produces the same canonical form, memoized across calls
//!   and hash-consed: equal results are the same object.
//!
//! ```rust
//! use logic_fuzz::builder::Builder;
//!
//! let builder = Builder::default();
//!
//! let x1 = builder.make_variable(1);
//! let x2 = builder.make_variable(2);
//! let f = builder.make_conjunction(vec![x1, x2, builder.make_true()]);
//! assert_eq!(f.to_string(), "AND[x1, x2]");
//!
//! // x1 = true, x2 = false
//! assert!(!builder.evaluate(&f, &[true, false]));
//!
//! let g = builder.make_disjunction(vec![f.clone(), builder.make_false(), f]);
//! assert_eq!(builder.simplify(&g).to_string(), "AND[x1, x2]");
//! ```
//!
//! ## Fuzzing
//!
//! The [`fuzzer`] grows a pool of random formulas, rewrites random members and
//! compares original and rewritten formulas on thousands of random models.
//! Everything is driven by the deterministic generator in [`random`], so a
//! reported seed replays the failing round exactly.
//!
//! ## Core Components
//!
//! - **[`formula`]**: the data model.
//! - **[`builder`]**: constructors and rewrites.
//! - **[`fuzzer`]**: the differential testing harness.
//! - **[`sink`]** and **[`invocation`]**: the harness's diagnostic output and
//!   argument handling.

pub mod builder;
pub mod cache;
pub mod formula;
pub mod fuzzer;
pub mod invocation;
pub mod random;
pub mod sink;
pub mod utils;
