use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV decoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Required table '{0}' is missing from the data directory")]
    MissingTable(String),

    #[error("Join cardinality violation in {table}: key {key} matches {count} rows")]
    JoinCardinality {
        table: &'static str,
        key: String,
        count: usize,
    },

    #[error("Driver '{0}' not found in the summary table")]
    DriverNotFound(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
