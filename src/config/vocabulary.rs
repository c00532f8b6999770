use super::traits::ConfigSection;
use crate::error::TtgpError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub ephemeral_constants: bool,
    pub ephemeral_low: f64,
    pub ephemeral_high: f64,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            ephemeral_constants: true,
            ephemeral_low: -1.0,
            ephemeral_high: 1.0,
        }
    }
}

impl ConfigSection for VocabularyConfig {
    fn section_name() -> &'static str {
        "vocabulary"
    }

    fn validate(&self) -> Result<(), TtgpError> {
        if self.ephemeral_constants && !(self.ephemeral_low < self.ephemeral_high) {
            return Err(TtgpError::Configuration(format!(
                "ephemeral range [{}, {}) is empty",
                self.ephemeral_low, self.ephemeral_high
            )));
        }
        Ok(())
    }
}
