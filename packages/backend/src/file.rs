//! File-backed stores: one JSON file per page, uploads in a plain directory
//! that the site serves statically.

use crate::service::{DocumentStore, ObjectStore, StoredPage};
use crate::BackendError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Keys become file names, so only a conservative character set is allowed
fn safe_key(key: &str) -> Option<&str> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    valid.then_some(key)
}

#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    dir: PathBuf,
}

impl FileDocumentStore {
    /// Pages live in `<data_dir>/pages/<slug>.json`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("pages"),
        }
    }

    fn page_path(&self, slug: &str) -> Result<PathBuf, BackendError> {
        let slug = safe_key(slug).ok_or_else(|| BackendError::NotFound(format!("invalid slug {:?}", slug)))?;
        Ok(self.dir.join(format!("{}.json", slug)))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn select(&self, slug: &str) -> Result<Option<StoredPage>, BackendError> {
        let path = self.page_path(slug)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn upsert(&self, page: StoredPage) -> Result<(), BackendError> {
        let path = self
            .page_path(&page.slug)
            .map_err(|e| BackendError::SaveFailure(e.to_string()))?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let json = serde_json::to_string_pretty(&page)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(slug = %page.slug, path = %path.display(), "page written");
        Ok(())
    }

    async fn list_slugs(&self) -> Result<Vec<String>, BackendError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut slugs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(slug) = name.strip_suffix(".json") {
                slugs.push(slug.to_string());
            }
        }
        slugs.sort();
        Ok(slugs)
    }
}

#[derive(Debug, Clone)]
pub struct FileObjectStore {
    dir: PathBuf,
    public_base: String,
}

impl FileObjectStore {
    pub fn new(dir: impl AsRef<Path>, public_base: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: Option<&str>) -> Result<(), BackendError> {
        let name = safe_key(path)
            .ok_or_else(|| BackendError::UploadFailure(format!("invalid object path {:?}", path)))?;
        let target = self.dir.join(name);

        let write = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&target, bytes).await
        };
        write
            .await
            .map_err(|e| BackendError::UploadFailure(e.to_string()))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_key() {
        assert_eq!(safe_key("home"), Some("home"));
        assert_eq!(safe_key("abc123.png"), Some("abc123.png"));
        assert_eq!(safe_key("../etc/passwd"), None);
        assert_eq!(safe_key("a/b"), None);
        assert_eq!(safe_key(""), None);
    }
}
