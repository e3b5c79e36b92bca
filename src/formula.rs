//! Formula data model.
//!
//! A [`Formula`] is a node of an immutable DAG: gates hold their children
//! through shared [`FormulaRef`] handles, so the same subformula object may be
//! reachable from many parents. Nodes are never modified after construction.
//!
//! Equality ([`PartialEq`]) and hashing ([`Hash`]) are *structural*: two
//! separately built formulas with the same shape compare equal. Gate children
//! are compared in order, there is no commutative reordering.
//!
//! Gates can only be created inside the crate (see [`Builder`][crate::builder::Builder]),
//! which keeps the constant-folding invariants of the smart constructors.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use num_bigint::BigUint;

use crate::utils::{hash_combine, hash_pair, StructuralHash};

/// Shared handle to a formula node.
pub type FormulaRef = Rc<Formula>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GateKind {
    And,
    Or,
}

impl GateKind {
    /// Value of the gate with no children: `AND[] = True`, `OR[] = False`.
    pub const fn identity(self) -> bool {
        matches!(self, GateKind::And)
    }

    /// Value that decides the gate on its own: `False` for AND, `True` for OR.
    pub const fn absorbing(self) -> bool {
        !self.identity()
    }

    const fn tag(self) -> u64 {
        match self {
            GateKind::And => 2,
            GateKind::Or => 3,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::And => write!(f, "AND"),
            GateKind::Or => write!(f, "OR"),
        }
    }
}

#[derive(Debug)]
pub struct Gate {
    kind: GateKind,
    children: Vec<FormulaRef>,
    /// Structural hash, computed once from the children's hashes.
    hash: u64,
}

impl Gate {
    fn new(kind: GateKind, children: Vec<FormulaRef>) -> Self {
        let hash = children
            .iter()
            .fold(hash_pair(kind.tag(), children.len() as u64), |h, c| {
                hash_combine(h, c.structural_hash())
            });
        Self {
            kind,
            children,
            hash,
        }
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn children(&self) -> &[FormulaRef] {
        &self.children
    }

    pub fn arity(&self) -> usize {
        self.children.len()
    }

    /// Structural comparison that visits every pair of gates at most once.
    ///
    /// `proven` holds the pairs already shown equal during this comparison, so
    /// two separately built DAGs with internal sharing are compared in time
    /// linear in their DAG size rather than their tree size.
    fn equal_to(
        &self,
        other: &Gate,
        proven: &mut HashSet<(*const Gate, *const Gate)>,
    ) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.kind != other.kind
            || self.hash != other.hash
            || self.children.len() != other.children.len()
        {
            return false;
        }
        let key = (self as *const Gate, other as *const Gate);
        if proven.contains(&key) {
            return true;
        }
        let equal = self.children.iter().zip(&other.children).all(|(a, b)| {
            Rc::ptr_eq(a, b)
                || match (a.as_ref(), b.as_ref()) {
                    (Formula::Gate(x), Formula::Gate(y)) => x.equal_to(y, proven),
                    (a, b) => a == b,
                }
        });
        if equal {
            proven.insert(key);
        }
        equal
    }
}

impl PartialEq for Gate {
    fn eq(&self, other: &Self) -> bool {
        self.equal_to(other, &mut HashSet::new())
    }
}

impl Eq for Gate {}

#[derive(Debug)]
pub enum Formula {
    Constant(bool),
    /// Signed literal: `x` for positive, `¬x` for negative. Never zero.
    Variable(i32),
    Gate(Gate),
}

impl Formula {
    pub(crate) fn new_gate(kind: GateKind, children: Vec<FormulaRef>) -> Self {
        Formula::Gate(Gate::new(kind, children))
    }

    pub fn arity(&self) -> usize {
        match self {
            Formula::Constant(_) => 0,
            Formula::Variable(_) => 1,
            Formula::Gate(gate) => gate.arity(),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Formula::Constant(_))
    }

    pub fn as_constant(&self) -> Option<bool> {
        match self {
            Formula::Constant(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<i32> {
        match self {
            Formula::Variable(literal) => Some(*literal),
            _ => None,
        }
    }

    pub fn as_gate(&self) -> Option<&Gate> {
        match self {
            Formula::Gate(gate) => Some(gate),
            _ => None,
        }
    }

    /// Direct children. Empty for leaves.
    pub fn children(&self) -> &[FormulaRef] {
        match self {
            Formula::Gate(gate) => gate.children(),
            _ => &[],
        }
    }

    /// Evaluate the formula under `model`, where `model[v - 1]` is the value of
    /// variable `v`.
    ///
    /// Literals whose variable lies outside the model evaluate to `false`,
    /// regardless of polarity.
    pub fn evaluate(&self, model: &[bool]) -> bool {
        match self {
            Formula::Constant(value) => *value,
            Formula::Variable(literal) => (literal.unsigned_abs() as usize)
                .checked_sub(1)
                .and_then(|index| model.get(index))
                .map_or(false, |&value| value ^ (*literal < 0)),
            Formula::Gate(gate) => match gate.kind {
                GateKind::And => gate.children.iter().all(|c| c.evaluate(model)),
                GateKind::Or => gate.children.iter().any(|c| c.evaluate(model)),
            },
        }
    }

    /// Number of distinct nodes (by identity) reachable from this one.
    pub fn dag_size(&self) -> usize {
        let mut visited: HashSet<*const Formula> = HashSet::new();
        let mut stack: Vec<&Formula> = vec![self];
        while let Some(node) = stack.pop() {
            if visited.insert(node as *const Formula) {
                stack.extend(node.children().iter().map(|c| c.as_ref()));
            }
        }
        visited.len()
    }

    /// Number of nodes once all sharing is unfolded into a tree.
    ///
    /// This is what recursive evaluation and rendering actually walk, and it
    /// grows exponentially in the depth of shared gates.
    pub fn tree_size(&self) -> BigUint {
        fn go(node: &Formula, memo: &mut HashMap<*const Formula, BigUint>) -> BigUint {
            if let Some(size) = memo.get(&(node as *const Formula)) {
                return size.clone();
            }
            let mut size = BigUint::from(1u32);
            for child in node.children() {
                size += go(child, memo);
            }
            memo.insert(node as *const Formula, size.clone());
            size
        }
        go(self, &mut HashMap::new())
    }

    /// Length of the longest path to a leaf (0 for leaves).
    pub fn depth(&self) -> usize {
        fn go(node: &Formula, memo: &mut HashMap<*const Formula, usize>) -> usize {
            if let Some(&depth) = memo.get(&(node as *const Formula)) {
                return depth;
            }
            let depth = node
                .children()
                .iter()
                .map(|c| 1 + go(c, memo))
                .max()
                .unwrap_or(0);
            memo.insert(node as *const Formula, depth);
            depth
        }
        go(self, &mut HashMap::new())
    }
}

impl StructuralHash for Formula {
    fn structural_hash(&self) -> u64 {
        match self {
            Formula::Constant(value) => value.structural_hash(),
            Formula::Variable(literal) => literal.structural_hash(),
            Formula::Gate(gate) => gate.hash,
        }
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Formula::Constant(a), Formula::Constant(b)) => a == b,
            (Formula::Variable(a), Formula::Variable(b)) => a == b,
            (Formula::Gate(a), Formula::Gate(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Constant(true) => write!(f, "True"),
            Formula::Constant(false) => write!(f, "False"),
            Formula::Variable(literal) => write!(f, "x{}", literal),
            Formula::Gate(gate) => {
                write!(f, "{}[", gate.kind)?;
                for (i, child) in gate.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, "]")
            }
        }
    }
}
