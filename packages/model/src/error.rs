//! Error types for the model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown widget: {0}")]
    UnknownWidget(String),

    #[error("Field {key} is not editable on {kind} elements")]
    UnknownField { kind: String, key: String },
}
