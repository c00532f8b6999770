pub mod compiler;
pub mod evaluator;
pub mod metrics;

pub use compiler::{compile, Program};
pub use evaluator::{FitnessEvaluator, RmseEvaluator};
pub use metrics::rmse;
