//! # Marble Editor
//!
//! Editing engine for the page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: widgets, elements, documents         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: tree store + gestures + edits       │
//! │  - Own the element tree, index ids by path  │
//! │  - Apply mutations, notify subscribers      │
//! │  - Drag widgets from the palette            │
//! │  - Turn inspector changes into patches      │
//! │  - Track uploads in flight                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ evaluator: tree → VNode → HTML              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: canvas and inspector are derived
//! 2. **Every write is a mutation**: no view holds a mutable element
//! 3. **Identity is stable**: ids are assigned once on drop and never reused
//! 4. **Missing targets are no-ops**: stale updates and deletes change nothing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marble_editor::{DragSource, DropTarget, EditSession, Point};
//! use marble_evaluator::FieldGroup;
//!
//! let mut session = EditSession::new("admin", Vec::new());
//!
//! // Drag a section from the palette onto the canvas
//! session.pointer_down(&DragSource::Widget("section".into()), Point::new(0.0, 0.0));
//! session.pointer_move(Point::new(40.0, 0.0));
//! let id = session.pointer_up(DropTarget::Canvas)?;
//!
//! // The new section is selected; give it three columns
//! session.edit_field(FieldGroup::Content, "columns", "3")?;
//! ```

mod drag;
mod errors;
mod inspector;
mod mutations;
mod pipeline;
mod session;
mod store;

pub use drag::{
    DragController, DragSource, DragState, DropOutcome, DropTarget, Point, DEFAULT_DRAG_THRESHOLD,
};
pub use errors::EditorError;
pub use inspector::{field_patch, upload_patch};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use pipeline::{Pipeline, PipelineResult};
pub use session::{EditSession, PendingUpload, UploadOutcome, UploadTicket};
pub use store::{Change, ElementTree, SubscriptionId};
