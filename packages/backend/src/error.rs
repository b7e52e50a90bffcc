//! Error types for backend collaborators

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    /// Bad credentials or a rejected sign-up
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Upload failed: {0}")]
    UploadFailure(String),

    #[error("Save failed: {0}")]
    SaveFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or HTTP-level failure talking to the hosted backend
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Transport(e.to_string())
    }
}
