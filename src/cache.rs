//! Simplifier cache.
//!
//! Two tables live here:
//!
//! - the **memo table** maps an input formula (by structure) to its simplified
//!   form, so a formula already simplified is never walked again;
//! - the **unique table** holds exactly one representative per structurally
//!   distinct simplified formula (hash consing).
//!
//! Both tables own their entries, so everything they hold stays alive until
//! [`SimplifyCache::clear`] is called.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::formula::{Formula, FormulaRef};

#[derive(Default)]
pub struct SimplifyCache {
    memo: HashMap<FormulaRef, FormulaRef>,
    unique: HashSet<FormulaRef>,
    hits: usize,
    misses: usize,
}

impl SimplifyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memo entries.
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty() && self.unique.is_empty()
    }

    /// Number of hash-consed representatives.
    pub fn unique_len(&self) -> usize {
        self.unique.len()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Look up the simplified form of `key`.
    pub fn get(&mut self, key: &Formula) -> Option<FormulaRef> {
        match self.memo.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: FormulaRef, value: FormulaRef) {
        self.memo.insert(key, value);
    }

    /// Return the representative structurally equal to `formula`, registering
    /// `formula` itself if there is none yet.
    pub fn intern(&mut self, formula: FormulaRef) -> FormulaRef {
        if let Some(existing) = self.unique.get(formula.as_ref()) {
            return existing.clone();
        }
        self.unique.insert(formula.clone());
        formula
    }

    /// Drop both tables. Counters are kept.
    pub fn clear(&mut self) {
        self.memo.clear();
        self.unique.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            memo_entries: self.memo.len(),
            unique_entries: self.unique.len(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub memo_entries: usize,
    pub unique_entries: usize,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, memo={}, unique={}",
            self.hits, self.misses, self.memo_entries, self.unique_entries
        )
    }
}
