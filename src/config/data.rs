use super::traits::ConfigSection;
use crate::error::TtgpError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub train_path: PathBuf,
    /// When absent, the tail of the training file is held out instead
    pub test_path: Option<PathBuf>,
    pub target_column: String,
    pub test_fraction: f64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("data/train.csv"),
            test_path: None,
            target_column: "target".to_string(),
            test_fraction: 0.2,
        }
    }
}

impl ConfigSection for DataConfig {
    fn section_name() -> &'static str {
        "data"
    }

    fn validate(&self) -> Result<(), TtgpError> {
        if self.target_column.is_empty() {
            return Err(TtgpError::Configuration(
                "target_column must not be empty".to_string(),
            ));
        }
        if self.test_path.is_none() && !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(TtgpError::Configuration(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}
