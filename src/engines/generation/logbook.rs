use crate::engines::generation::tree::Individual;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One row of the run log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRecord {
    pub generation: usize,
    /// Individuals evaluated this generation
    pub evaluations: usize,
    /// Held-out error of the representative individual
    pub representative_error: f64,
    pub representative_size: usize,
    pub min_error: f64,
    pub mean_error: f64,
    pub max_error: f64,
    pub mean_size: f64,
    pub archive_size: usize,
    pub transient_live: usize,
}

/// Training-error and size statistics over the finite part of a population
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    pub min_error: f64,
    pub mean_error: f64,
    pub max_error: f64,
    pub mean_size: f64,
}

impl PopulationStats {
    pub fn compile(population: &[Individual]) -> Self {
        let errors: Vec<f64> = population
            .iter()
            .filter_map(|ind| ind.fitness.map(|f| f.error))
            .filter(|e| e.is_finite())
            .collect();

        let (min_error, max_error, mean_error) = if errors.is_empty() {
            (f64::INFINITY, f64::INFINITY, f64::INFINITY)
        } else {
            (
                errors.iter().copied().fold(f64::INFINITY, f64::min),
                errors.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                errors.iter().sum::<f64>() / errors.len() as f64,
            )
        };

        let mean_size = if population.is_empty() {
            0.0
        } else {
            population.iter().map(|ind| ind.tree.size() as f64).sum::<f64>() / population.len() as f64
        };

        Self {
            min_error,
            mean_error,
            max_error,
            mean_size,
        }
    }
}

impl fmt::Display for GenerationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gen {:>4} | nevals {:>4} | best {:.6} (size {}) | min {:.6} avg {:.6} max {:.6} | avg size {:.1} | archive {} | transient {}",
            self.generation,
            self.evaluations,
            self.representative_error,
            self.representative_size,
            self.min_error,
            self.mean_error,
            self.max_error,
            self.mean_size,
            self.archive_size,
            self.transient_live,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Logbook {
    pub started_at: DateTime<Utc>,
    records: Vec<GenerationRecord>,
}

impl Default for Logbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Logbook {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, record: GenerationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
