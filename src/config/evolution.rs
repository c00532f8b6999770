use super::traits::{check_probability, ConfigSection};
use crate::engines::generation::operators::MAX_TREE_HEIGHT;
use crate::error::TtgpError;
use serde::{Deserialize, Serialize};

/// Share of the population carried over untouched each generation (TTGP only)
pub const ELITE_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Multi-objective search with a transient terminal set
    Ttgp,
    /// Single-objective search on error alone
    Sgp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub algorithm: Algorithm,
    pub generations: usize,
    pub population_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub transient_mutation_rate: f64,
    pub init_min_depth: usize,
    pub init_max_depth: usize,
    pub tournament_size: usize,
    pub seed: Option<u64>,
    pub parallel_evaluation: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Ttgp,
            generations: 50,
            population_size: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            transient_mutation_rate: 0.1,
            init_min_depth: 1,
            init_max_depth: 4,
            tournament_size: 10,
            seed: None,
            parallel_evaluation: false,
        }
    }
}

impl EvolutionConfig {
    /// Defaults for the single-objective variant
    pub fn sgp() -> Self {
        Self {
            algorithm: Algorithm::Sgp,
            crossover_rate: 0.9,
            transient_mutation_rate: 0.0,
            ..Self::default()
        }
    }

    /// Number of elites held back from the operators
    pub fn elite_count(&self) -> usize {
        match self.algorithm {
            Algorithm::Ttgp => (self.population_size as f64 * ELITE_FRACTION) as usize,
            Algorithm::Sgp => 0,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), TtgpError> {
        if self.population_size == 0 {
            return Err(TtgpError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }
        if self.generations == 0 {
            return Err(TtgpError::Configuration(
                "Generation count must be positive".to_string(),
            ));
        }
        check_probability(Self::section_name(), "crossover_rate", self.crossover_rate)?;
        check_probability(Self::section_name(), "mutation_rate", self.mutation_rate)?;
        check_probability(
            Self::section_name(),
            "transient_mutation_rate",
            self.transient_mutation_rate,
        )?;
        if self.init_min_depth > self.init_max_depth {
            return Err(TtgpError::Configuration(format!(
                "init_min_depth ({}) exceeds init_max_depth ({})",
                self.init_min_depth, self.init_max_depth
            )));
        }
        if self.init_max_depth > MAX_TREE_HEIGHT {
            return Err(TtgpError::Configuration(format!(
                "init_max_depth must not exceed {}",
                MAX_TREE_HEIGHT
            )));
        }
        if self.tournament_size == 0 {
            return Err(TtgpError::Configuration(
                "Tournament size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
