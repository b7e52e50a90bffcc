use crate::service::ObjectStore;
use crate::BackendError;
use std::sync::Arc;

/// Object path for an uploaded file: a random name keeping the original
/// extension. Names without a dot get no extension.
pub fn object_path(random: u64, file_name: &str) -> String {
    let extension: Option<String> = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.chars().filter(|c| c.is_ascii_alphanumeric()).collect())
        .filter(|ext: &String| !ext.is_empty());
    match extension {
        Some(ext) => format!("{:016x}.{}", random, ext),
        None => format!("{:016x}", random),
    }
}

/// Uploads images and resolves their public URL
#[derive(Clone)]
pub struct ImageUploader {
    store: Arc<dyn ObjectStore>,
}

impl ImageUploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Upload under a fresh random path and return the public URL.
    /// Collisions are only made unlikely, not prevented.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, BackendError> {
        let path = object_path(rand::random(), file_name);
        if let Err(e) = self.store.upload(&path, bytes, content_type).await {
            tracing::error!(file_name, path = %path, error = %e, "image upload failed");
            return Err(match e {
                BackendError::UploadFailure(_) => e,
                other => BackendError::UploadFailure(other.to_string()),
            });
        }
        tracing::info!(file_name, path = %path, "image uploaded");
        Ok(self.store.public_url(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_keeps_extension() {
        assert_eq!(object_path(255, "photo.final.JPG"), "00000000000000ff.JPG");
        assert_eq!(object_path(1, "README"), "0000000000000001");
        assert_eq!(object_path(1, "weird."), "0000000000000001");
    }
}
