//! In-process backend for development and tests.
//!
//! Implements all three collaborators over maps guarded by async locks.
//! Failure switches let tests exercise the upload and save error paths.

use crate::service::{AuthService, Credentials, DocumentStore, ObjectStore, Session, SignUp, StoredPage};
use crate::BackendError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    password: String,
}

#[derive(Debug)]
pub struct MemoryBackend {
    accounts: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<String, Session>>,
    objects: RwLock<HashMap<String, Vec<u8>>>,
    pages: RwLock<BTreeMap<String, StoredPage>>,
    public_base: String,
    /// Sign-ups return a session immediately (no email verification)
    auto_confirm: bool,
    fail_uploads: AtomicBool,
    fail_saves: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            objects: RwLock::new(HashMap::new()),
            pages: RwLock::new(BTreeMap::new()),
            public_base: "/uploads".to_string(),
            auto_confirm: true,
            fail_uploads: AtomicBool::new(false),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Pre-register accounts that can sign in straight away
    pub fn with_accounts(self, accounts: impl IntoIterator<Item = Credentials>) -> Self {
        let map = accounts
            .into_iter()
            .map(|c| {
                (
                    c.email,
                    Account {
                        user_id: random_token(),
                        password: c.password,
                    },
                )
            })
            .collect();
        Self {
            accounts: RwLock::new(map),
            ..self
        }
    }

    pub fn with_public_base(mut self, base: impl Into<String>) -> Self {
        self.public_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_auto_confirm(mut self, auto_confirm: bool) -> Self {
        self.auto_confirm = auto_confirm;
        self
    }

    pub fn set_upload_failure(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_save_failure(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Bytes stored under `path`
    pub async fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(path).cloned()
    }

    async fn open_session(&self, email: &str, user_id: &str) -> Session {
        let session = Session {
            access_token: random_token(),
            user_id: user_id.to_string(),
            email: email.to_string(),
        };
        self.sessions
            .write()
            .await
            .insert(session.access_token.clone(), session.clone());
        session
    }
}

pub(crate) fn random_token() -> String {
    format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>())
}

#[async_trait]
impl AuthService for MemoryBackend {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, BackendError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(BackendError::AuthFailure(
                "email and password are required".to_string(),
            ));
        }
        let user_id = {
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(&credentials.email) {
                return Err(BackendError::AuthFailure("User already registered".to_string()));
            }
            let user_id = random_token();
            accounts.insert(
                credentials.email.clone(),
                Account {
                    user_id: user_id.clone(),
                    password: credentials.password.clone(),
                },
            );
            user_id
        };

        let session = if self.auto_confirm {
            Some(self.open_session(&credentials.email, &user_id).await)
        } else {
            None
        };
        Ok(SignUp {
            user_id: Some(user_id),
            session,
        })
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session, BackendError> {
        let user_id = {
            let accounts = self.accounts.read().await;
            match accounts.get(&credentials.email) {
                Some(account) if account.password == credentials.password => account.user_id.clone(),
                _ => {
                    return Err(BackendError::AuthFailure(
                        "Invalid login credentials".to_string(),
                    ))
                }
            }
        };
        Ok(self.open_session(&credentials.email, &user_id).await)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.sessions.write().await.remove(access_token);
        Ok(())
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, BackendError> {
        Ok(self.sessions.read().await.get(access_token).cloned())
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: Option<&str>) -> Result<(), BackendError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BackendError::UploadFailure("storage unavailable".to_string()));
        }
        self.objects.write().await.insert(path.to_string(), bytes);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base, path)
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn select(&self, slug: &str) -> Result<Option<StoredPage>, BackendError> {
        Ok(self.pages.read().await.get(slug).cloned())
    }

    async fn upsert(&self, page: StoredPage) -> Result<(), BackendError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BackendError::SaveFailure("database unavailable".to_string()));
        }
        self.pages.write().await.insert(page.slug.clone(), page);
        Ok(())
    }

    async fn list_slugs(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.pages.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_flow() {
        let backend = MemoryBackend::new().with_accounts([Credentials::new("a@b.c", "secret")]);

        let bad = backend
            .sign_in_with_password(&Credentials::new("a@b.c", "wrong"))
            .await;
        assert!(matches!(bad, Err(BackendError::AuthFailure(_))));

        let session = backend
            .sign_in_with_password(&Credentials::new("a@b.c", "secret"))
            .await
            .unwrap();
        assert_eq!(
            backend.get_session(&session.access_token).await.unwrap(),
            Some(session.clone())
        );

        backend.sign_out(&session.access_token).await.unwrap();
        assert_eq!(backend.get_session(&session.access_token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_up_without_auto_confirm() {
        let backend = MemoryBackend::new().with_auto_confirm(false);
        let result = backend.sign_up(&Credentials::new("x@y.z", "pw")).await.unwrap();
        assert!(result.user_id.is_some());
        assert!(result.session.is_none());

        let again = backend.sign_up(&Credentials::new("x@y.z", "pw")).await;
        assert!(matches!(again, Err(BackendError::AuthFailure(_))));
    }

    #[tokio::test]
    async fn test_upload_failure_switch() {
        let backend = MemoryBackend::new();
        backend.set_upload_failure(true);
        let result = backend.upload("a.png", vec![1, 2, 3], None).await;
        assert!(matches!(result, Err(BackendError::UploadFailure(_))));
        assert!(backend.object("a.png").await.is_none());
    }

    #[test]
    fn test_public_base_prefixes_urls() {
        let backend = MemoryBackend::new().with_public_base("https://cdn.marble.test/images/");
        assert_eq!(backend.public_url("a.png"), "https://cdn.marble.test/images/a.png");
        assert_eq!(MemoryBackend::new().public_url("a.png"), "/uploads/a.png");
    }
}
