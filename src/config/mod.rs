pub mod traits;
pub mod evolution;
pub mod transient;
pub mod data;
pub mod vocabulary;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::{Algorithm, EvolutionConfig, ELITE_FRACTION};
pub use transient::{ScoringMethod, TransientConfig};
pub use data::DataConfig;
pub use vocabulary::VocabularyConfig;
