//! # Persistence Adapter
//!
//! Whole-tree load/save of page documents keyed by slug. Saves replace the
//! stored document wholesale; there is no merge, versioning or conflict
//! check, so the last write wins.

use crate::service::{DocumentStore, StoredPage};
use crate::BackendError;
use chrono::Utc;
use marble_model::{decode_elements, PageDocument, PageElement};
use std::sync::Arc;

/// Why a save was requested. Both modes write the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Draft,
    Publish,
}

impl SaveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveMode::Draft => "draft",
            SaveMode::Publish => "publish",
        }
    }
}

#[derive(Clone)]
pub struct PageRepository {
    store: Arc<dyn DocumentStore>,
}

impl PageRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Load a page. Content that is not a sequence loads as an empty tree.
    pub async fn load(&self, slug: &str) -> Result<Option<PageDocument>, BackendError> {
        let Some(row) = self.store.select(slug).await? else {
            return Ok(None);
        };

        let decoded = decode_elements(row.content);
        if decoded.malformed {
            tracing::warn!(slug, "stored content is not a sequence, loading an empty page");
        }
        if decoded.skipped > 0 {
            tracing::warn!(slug, skipped = decoded.skipped, "skipped unreadable elements");
        }

        Ok(Some(PageDocument {
            slug: row.slug,
            title: row.title,
            content: decoded.elements,
            updated_at: row.updated_at,
        }))
    }

    /// Upsert the whole tree under `slug` with `updated_at = now`
    pub async fn save(
        &self,
        slug: &str,
        title: &str,
        elements: &[PageElement],
        mode: SaveMode,
    ) -> Result<PageDocument, BackendError> {
        let document = PageDocument {
            slug: slug.to_string(),
            title: title.to_string(),
            content: elements.to_vec(),
            updated_at: Utc::now(),
        };
        let row = StoredPage {
            slug: document.slug.clone(),
            title: document.title.clone(),
            content: serde_json::to_value(&document.content)?,
            updated_at: document.updated_at,
        };

        match self.store.upsert(row).await {
            Ok(()) => {
                tracing::info!(slug, mode = mode.as_str(), elements = elements.len(), "page saved");
                Ok(document)
            }
            Err(e) => {
                tracing::error!(slug, mode = mode.as_str(), error = %e, "page save failed");
                Err(match e {
                    BackendError::SaveFailure(_) => e,
                    other => BackendError::SaveFailure(other.to_string()),
                })
            }
        }
    }

    pub async fn save_draft(&self, slug: &str, title: &str, elements: &[PageElement]) -> Result<PageDocument, BackendError> {
        self.save(slug, title, elements, SaveMode::Draft).await
    }

    pub async fn publish(&self, slug: &str, title: &str, elements: &[PageElement]) -> Result<PageDocument, BackendError> {
        self.save(slug, title, elements, SaveMode::Publish).await
    }

    pub async fn list_slugs(&self) -> Result<Vec<String>, BackendError> {
        self.store.list_slugs().await
    }
}
