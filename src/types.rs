use crate::functions::primitives::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an entry in the transient terminal set.
///
/// Trees store the key, never the entry itself, so retiring an entry can only
/// leave a dangling key behind, which the compiler resolves to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransientKey(pub u64);

impl fmt::Display for TransientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// A single node of a prefix-ordered expression tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Unary(UnaryOp),
    Binary(BinaryOp),
    Feature(usize),
    Constant(f64),
    Transient(TransientKey),
}

impl Node {
    pub fn arity(&self) -> usize {
        match self {
            Node::Unary(_) => 1,
            Node::Binary(_) => 2,
            Node::Feature(_) | Node::Constant(_) | Node::Transient(_) => 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.arity() == 0
    }
}

/// Two-objective fitness vector, both minimised.
///
/// An individual with no fitness (`Option::None`) is "invalid"; there is no
/// sentinel number for that state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    pub error: f64,
    pub complexity: f64,
}

impl Fitness {
    pub fn new(error: f64, complexity: f64) -> Self {
        Self { error, complexity }
    }

    /// Worst possible fitness, used for individuals that fail to evaluate
    pub fn sentinel(complexity: f64) -> Self {
        Self {
            error: f64::INFINITY,
            complexity,
        }
    }

    pub fn objectives(&self) -> [f64; 2] {
        [self.error, self.complexity]
    }

    /// Strict Pareto dominance under minimisation
    pub fn dominates(&self, other: &Fitness) -> bool {
        crate::engines::generation::pareto::dominates(&self.objectives(), &other.objectives())
    }
}
