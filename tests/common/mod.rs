#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use ttgp::config::{EvolutionConfig, TransientConfig};
use ttgp::data::Dataset;
use ttgp::engines::evaluation::{FitnessEvaluator, RmseEvaluator};
use ttgp::engines::generation::{ExpressionTree, TransientSet};
use ttgp::error::Result;
use ttgp::functions::Vocabulary;
use ttgp::types::Fitness;

/// y = x0^2 + x1 sampled on a small grid
pub fn quadratic_dataset() -> Arc<Dataset> {
    let rows: Vec<Vec<f64>> = (0..20)
        .map(|i| vec![(i as f64 - 10.0) / 4.0, (i % 5) as f64 - 2.0])
        .collect();
    let labels = rows.iter().map(|r| r[0] * r[0] + r[1]).collect();
    Arc::new(Dataset::new(vec!["x0".to_string(), "x1".to_string()], rows, labels).unwrap())
}

pub fn vocabulary() -> Arc<Vocabulary> {
    Arc::new(
        Vocabulary::new(vec!["x0".to_string(), "x1".to_string()], 2)
            .unwrap()
            .with_ephemeral_constants(-1.0, 1.0),
    )
}

pub fn evolution_config(population_size: usize, generations: usize) -> EvolutionConfig {
    EvolutionConfig {
        population_size,
        generations,
        seed: Some(42),
        ..EvolutionConfig::default()
    }
}

/// RMSE evaluator that counts how often it is called
#[derive(Clone)]
pub struct CountingEvaluator {
    pub calls: Arc<AtomicUsize>,
    inner: RmseEvaluator,
}

impl CountingEvaluator {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            inner: RmseEvaluator::new(dataset),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FitnessEvaluator for CountingEvaluator {
    fn evaluate(&self, tree: &ExpressionTree, transient: &TransientSet) -> Result<Fitness> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.evaluate(tree, transient)
    }
}

pub fn transient_config(arity: usize, lifespan: usize) -> TransientConfig {
    TransientConfig {
        arity,
        lifespan,
        ..TransientConfig::default()
    }
}
