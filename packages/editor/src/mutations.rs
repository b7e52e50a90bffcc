//! # Tree Mutations
//!
//! The complete write API of the element tree. Every change to a page goes
//! through one of these, which keeps the id index, the version counter and
//! subscribers consistent.
//!
//! ## Semantics
//!
//! ### Append
//! - Adds a top-level element at the end; always succeeds for fresh ids
//!
//! ### InsertChild
//! - Adds an element to a container's column slot, tagging it with
//!   `columnIndex`
//! - Fails if the parent is missing, is not a container, or the slot is out
//!   of range
//!
//! ### Update
//! - Shallow merge of `content` and `styles`, key by key
//! - Missing ids are a no-op, not an error
//!
//! ### Delete
//! - Removes the element and its descendants, at any depth
//! - Clears the selection when it pointed into the removed subtree
//! - Missing ids are a no-op
//!
//! ### Replace
//! - Swaps the whole tree (document load); clears the selection

use marble_model::{ElementPatch, PageElement};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    /// Add a top-level element at the end
    Append { element: PageElement },

    /// Add an element to a container's column slot
    #[serde(rename_all = "camelCase")]
    InsertChild {
        parent_id: String,
        column_index: usize,
        element: PageElement,
    },

    /// Shallow-merge a patch into an element
    Update { id: String, patch: ElementPatch },

    /// Remove an element and its descendants
    Delete { id: String },

    /// Replace the whole tree
    Replace { elements: Vec<PageElement> },
}

impl Mutation {
    /// Id of the element the mutation is about, if any
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Mutation::Append { element } | Mutation::InsertChild { element, .. } => {
                Some(element.id.as_str())
            }
            Mutation::Update { id, .. } | Mutation::Delete { id } => Some(id.as_str()),
            Mutation::Replace { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Append { .. } => "append",
            Mutation::InsertChild { .. } => "insert_child",
            Mutation::Update { .. } => "update",
            Mutation::Delete { .. } => "delete",
            Mutation::Replace { .. } => "replace",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Element {0} cannot hold children")]
    NotAContainer(String),

    #[error("Column {column_index} is out of range for {parent_id} ({columns} columns)")]
    ColumnOutOfRange {
        parent_id: String,
        column_index: usize,
        columns: usize,
    },

    #[error("Duplicate element id: {0}")]
    DuplicateId(String),
}

/// Outcome of an applied mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MutationResult {
    /// Tree version after the mutation
    pub version: u64,
    /// False when the mutation targeted a missing id and changed nothing
    pub applied: bool,
}
