use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtgpError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Vocabulary contract violated: {0}")]
    VocabularyContract(String),

    #[error("Metric contract violated: {0}")]
    MetricContract(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

impl TtgpError {
    /// Errors the driver absorbs by assigning the sentinel fitness.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TtgpError::Evaluation(_))
    }
}

pub type Result<T> = std::result::Result<T, TtgpError>;
