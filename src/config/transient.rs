use super::traits::ConfigSection;
use crate::error::TtgpError;
use serde::{Deserialize, Serialize};

/// How mined candidate terminals are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringMethod {
    Frequency,
    ImprovementWeighted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransientConfig {
    /// Maximum number of live entries
    pub arity: usize,
    /// Generations an entry stays eligible before forced retirement
    pub lifespan: usize,
    pub scoring: ScoringMethod,
    pub max_candidate_height: usize,
}

impl Default for TransientConfig {
    fn default() -> Self {
        Self {
            arity: 1,
            lifespan: 5,
            scoring: ScoringMethod::ImprovementWeighted,
            max_candidate_height: 4,
        }
    }
}

impl ConfigSection for TransientConfig {
    fn section_name() -> &'static str {
        "transient"
    }

    fn validate(&self) -> Result<(), TtgpError> {
        if self.lifespan == 0 {
            return Err(TtgpError::Configuration(
                "Transient lifespan must be at least one generation".to_string(),
            ));
        }
        if self.max_candidate_height == 0 {
            return Err(TtgpError::Configuration(
                "max_candidate_height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
