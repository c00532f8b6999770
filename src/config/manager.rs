use super::{
    data::DataConfig,
    evolution::EvolutionConfig,
    transient::TransientConfig,
    traits::ConfigSection,
    vocabulary::VocabularyConfig,
};
use crate::error::TtgpError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Environment variables with this prefix override file values,
/// e.g. `TTGP__EVOLUTION__POPULATION_SIZE=200`
pub const ENV_PREFIX: &str = "TTGP";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub transient: TransientConfig,
    pub data: DataConfig,
    pub vocabulary: VocabularyConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TtgpError> {
        self.evolution.validate()?;
        self.transient.validate()?;
        self.data.validate()?;
        self.vocabulary.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Loads a TOML file layered with `TTGP__*` environment overrides
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TtgpError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        *self.write()? = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TtgpError> {
        let toml_str = toml::to_string_pretty(&self.get()?)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig, TtgpError> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|_| TtgpError::Configuration("config lock poisoned".to_string()))
    }

    /// Applies `f` and keeps the result only if it validates
    pub fn update<F>(&self, f: F) -> Result<(), TtgpError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get()?;
        f(&mut candidate);
        candidate.validate()?;
        *self.write()? = candidate;
        Ok(())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, AppConfig>, TtgpError> {
        self.config
            .write()
            .map_err(|_| TtgpError::Configuration("config lock poisoned".to_string()))
    }
}
