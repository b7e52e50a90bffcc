//! # Marble Model
//!
//! Data model for the page builder: typed content blocks ("elements"),
//! the widget catalog they are stamped from, the per-kind schema table that
//! drives rendering and editing, and the persisted page document.
//!
//! ```text
//! catalog (Widget) ──instantiate──▶ PageElement ──▶ PageDocument (slug)
//!                                      │
//!                                 schema_for(kind)
//!                                      │
//!                         content fields / style fields
//! ```

pub mod catalog;
pub mod document;
pub mod element;
pub mod error;
pub mod id_generator;
pub mod schema;

pub use catalog::{find_widget, list_widgets, Widget};
pub use document::{decode_elements, DecodedContent, PageDocument, DEFAULT_SLUG};
pub use element::{ElementKind, ElementPatch, FieldMap, PageElement};
pub use error::ModelError;
pub use id_generator::IdGenerator;
pub use schema::{schema_for, FieldSpec, InputKind, KindSchema, STYLE_FIELDS};
