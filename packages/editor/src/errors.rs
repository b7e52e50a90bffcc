//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Model error: {0}")]
    Model(#[from] marble_model::ModelError),

    #[error("No element is selected")]
    NothingSelected,

    #[error("Unknown upload ticket: {0}")]
    UnknownUpload(u64),
}
