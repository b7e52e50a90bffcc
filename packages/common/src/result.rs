use crate::error::ConfigError;

/// Result type for configuration handling
pub type ConfigResult<T> = Result<T, ConfigError>;
