//! Collaborator contracts.
//!
//! The site never talks to a concrete backend. It holds these three traits
//! behind `Arc<dyn _>` so the memory, file and hosted implementations are
//! interchangeable.

use crate::BackendError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Authenticated admin session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
}

/// Result of creating an account
#[derive(Debug, Clone, PartialEq)]
pub struct SignUp {
    pub user_id: Option<String>,
    /// Absent when the service requires email verification first
    pub session: Option<Session>,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, BackendError>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    /// Session for a token, if it is still valid
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, BackendError>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<(), BackendError>;

    fn public_url(&self, path: &str) -> String;
}

/// One row of the pages table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPage {
    pub slug: String,
    #[serde(default)]
    pub title: String,
    /// Stored as-is; decoded leniently on load
    #[serde(default)]
    pub content: Value,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn select(&self, slug: &str) -> Result<Option<StoredPage>, BackendError>;

    /// Insert or replace keyed by slug; last write wins
    async fn upsert(&self, page: StoredPage) -> Result<(), BackendError>;

    async fn list_slugs(&self) -> Result<Vec<String>, BackendError>;
}
