use crate::error::{Result, TtgpError};

/// Root-mean-squared error between predictions and ground truth
pub fn rmse(predictions: &[f64], actual: &[f64]) -> Result<f64> {
    if predictions.len() != actual.len() {
        return Err(TtgpError::MetricContract(format!(
            "{} predictions for {} targets",
            predictions.len(),
            actual.len()
        )));
    }
    if actual.is_empty() {
        return Err(TtgpError::MetricContract("no targets to score".to_string()));
    }

    let sum_sq: f64 = predictions
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a) * (p - a))
        .sum();

    Ok((sum_sq / actual.len() as f64).sqrt())
}
