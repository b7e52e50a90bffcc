use thiserror::Error;

/// Errors loading or writing `marble.config.json`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: String, value: String },

    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(String),
}
