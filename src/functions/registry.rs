use super::primitives::{BinaryOp, UnaryOp};
use crate::error::{Result, TtgpError};
use crate::types::Node;
use rand::Rng;

/// Immutable primitive/terminal vocabulary shared by tree generation and the
/// genetic operators.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    feature_names: Vec<String>,
    unary: Vec<UnaryOp>,
    binary: Vec<BinaryOp>,
    ephemeral_range: Option<(f64, f64)>,
}

impl Vocabulary {
    /// Arithmetic vocabulary over `arity` input features
    pub fn new(feature_names: Vec<String>, arity: usize) -> Result<Self> {
        Self::with_primitives(feature_names, arity, UnaryOp::ALL.to_vec(), BinaryOp::ALL.to_vec())
    }

    pub fn with_primitives(
        feature_names: Vec<String>,
        arity: usize,
        unary: Vec<UnaryOp>,
        binary: Vec<BinaryOp>,
    ) -> Result<Self> {
        if feature_names.len() != arity {
            return Err(TtgpError::VocabularyContract(format!(
                "expected {} feature names, got {}",
                arity,
                feature_names.len()
            )));
        }
        if arity == 0 {
            return Err(TtgpError::VocabularyContract(
                "vocabulary needs at least one input feature".to_string(),
            ));
        }
        if unary.is_empty() && binary.is_empty() {
            return Err(TtgpError::VocabularyContract(
                "vocabulary needs at least one primitive".to_string(),
            ));
        }

        Ok(Self {
            feature_names,
            unary,
            binary,
            ephemeral_range: None,
        })
    }

    /// Adds an ephemeral random constant terminal drawn uniformly from `[low, high)`
    pub fn with_ephemeral_constants(mut self, low: f64, high: f64) -> Self {
        if low < high {
            self.ephemeral_range = Some((low, high));
        }
        self
    }

    pub fn arity(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn feature_name(&self, index: usize) -> Option<&str> {
        self.feature_names.get(index).map(|s| s.as_str())
    }

    pub fn primitive_count(&self) -> usize {
        self.unary.len() + self.binary.len()
    }

    fn terminal_count(&self) -> usize {
        self.feature_names.len() + usize::from(self.ephemeral_range.is_some())
    }

    /// Ratio of terminals to all vocabulary entries, used by the grow strategy
    pub fn terminal_ratio(&self) -> f64 {
        let terminals = self.terminal_count() as f64;
        terminals / (terminals + self.primitive_count() as f64)
    }

    pub fn random_primitive<R: Rng>(&self, rng: &mut R) -> Node {
        let idx = rng.gen_range(0..self.primitive_count());
        if idx < self.unary.len() {
            Node::Unary(self.unary[idx])
        } else {
            Node::Binary(self.binary[idx - self.unary.len()])
        }
    }

    pub fn random_terminal<R: Rng>(&self, rng: &mut R) -> Node {
        let idx = rng.gen_range(0..self.terminal_count());
        match self.ephemeral_range {
            Some((low, high)) if idx == self.feature_names.len() => {
                Node::Constant(rng.gen_range(low..high))
            }
            _ => Node::Feature(idx),
        }
    }
}
