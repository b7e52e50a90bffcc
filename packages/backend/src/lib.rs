//! # Marble Backend
//!
//! The page builder's external collaborators and the adapters over them.
//!
//! | Collaborator | Trait | Implementations |
//! |---|---|---|
//! | accounts and sessions | [`AuthService`] | [`MemoryBackend`], [`SupabaseBackend`] |
//! | image storage | [`ObjectStore`] | [`MemoryBackend`], [`FileObjectStore`], [`SupabaseBackend`] |
//! | page rows | [`DocumentStore`] | [`MemoryBackend`], [`FileDocumentStore`], [`SupabaseBackend`] |
//!
//! [`PageRepository`] and [`ImageUploader`] sit on top and are what the site
//! and CLI call.

mod error;
mod file;
mod memory;
mod repository;
mod service;
mod supabase;
mod uploader;

pub use error::BackendError;
pub use file::{FileDocumentStore, FileObjectStore};
pub use memory::MemoryBackend;
pub use repository::{PageRepository, SaveMode};
pub use service::{AuthService, Credentials, DocumentStore, ObjectStore, Session, SignUp, StoredPage};
pub use supabase::{SupabaseBackend, SupabaseConfig};
pub use uploader::{object_path, ImageUploader};
