use super::compiler::compile;
use super::metrics::rmse;
use crate::data::Dataset;
use crate::engines::generation::transient::TransientSet;
use crate::engines::generation::tree::ExpressionTree;
use crate::error::{Result, TtgpError};
use crate::types::Fitness;
use std::sync::Arc;

/// Produces the (error, complexity) fitness vector of a tree.
///
/// `TtgpError::Evaluation` marks a per-individual failure the driver turns
/// into the sentinel fitness; any other error aborts the run.
pub trait FitnessEvaluator: Send + Sync {
    fn evaluate(&self, tree: &ExpressionTree, transient: &TransientSet) -> Result<Fitness>;
}

/// RMSE over a dataset paired with node count
#[derive(Debug, Clone)]
pub struct RmseEvaluator {
    dataset: Arc<Dataset>,
}

impl RmseEvaluator {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Error objective alone
    pub fn error(&self, tree: &ExpressionTree, transient: &TransientSet) -> Result<f64> {
        let program = compile(tree, transient)?;
        let predictions = program.predict_all(self.dataset.rows())?;
        let error = rmse(&predictions, self.dataset.labels())?;

        if !error.is_finite() {
            return Err(TtgpError::Evaluation(format!("non-finite error for {}", tree)));
        }
        Ok(error)
    }
}

impl FitnessEvaluator for RmseEvaluator {
    fn evaluate(&self, tree: &ExpressionTree, transient: &TransientSet) -> Result<Fitness> {
        let error = self.error(tree, transient)?;
        Ok(Fitness::new(error, tree.size() as f64))
    }
}
