use crate::events::{BuilderEvent, EventBus, EventKind};
use crate::sessions::{session_token, AdminSession, SessionRegistry};
use anyhow::{bail, Context};
use axum::http::HeaderMap;
use marble_backend::{
    AuthService, Credentials, DocumentStore, FileDocumentStore, FileObjectStore, ImageUploader,
    MemoryBackend, ObjectStore, PageRepository, Session, SupabaseBackend, SupabaseConfig,
};
use marble_common::{BackendKind, Config};
use marble_editor::{EditSession, Pipeline};
use marble_evaluator::MarkupPolicy;
use marble_model::PageElement;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The three collaborators the site talks to
#[derive(Clone)]
pub struct Backends {
    pub auth: Arc<dyn AuthService>,
    pub documents: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl Backends {
    /// Select implementations from the `backend` config section
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend = &config.backend;
        let admins = backend
            .admins
            .iter()
            .map(|a| Credentials::new(a.email.clone(), a.password.clone()));

        match backend.kind {
            BackendKind::Memory => {
                let memory = Arc::new(MemoryBackend::new().with_accounts(admins));
                Ok(Self {
                    auth: memory.clone(),
                    documents: memory,
                    objects: Arc::new(FileObjectStore::new(&config.server.uploads_dir, "/uploads")),
                })
            }
            BackendKind::File => {
                let auth = Arc::new(MemoryBackend::new().with_accounts(admins));
                Ok(Self {
                    auth,
                    documents: Arc::new(FileDocumentStore::new(&backend.data_dir)),
                    objects: Arc::new(FileObjectStore::new(&config.server.uploads_dir, "/uploads")),
                })
            }
            BackendKind::Supabase => {
                let (Some(url), Some(key)) = (backend.url.clone(), backend.key.clone()) else {
                    bail!("supabase backend needs backend.url and backend.key (or MARBLE_BACKEND_URL / MARBLE_BACKEND_KEY)");
                };
                let hosted = Arc::new(SupabaseBackend::new(SupabaseConfig {
                    url,
                    key,
                    bucket: backend.bucket.clone(),
                    table: backend.table.clone(),
                }));
                Ok(Self {
                    auth: hosted.clone(),
                    documents: hosted.clone(),
                    objects: hosted,
                })
            }
        }
    }

    /// All three roles served by one in-process backend
    pub fn memory(backend: Arc<MemoryBackend>) -> Self {
        Self {
            auth: backend.clone(),
            documents: backend.clone(),
            objects: backend,
        }
    }
}

pub struct AppState {
    pub config: Config,
    pub auth: Arc<dyn AuthService>,
    pub pages: PageRepository,
    pub uploader: ImageUploader,
    pub sessions: SessionRegistry,
    pub events: EventBus,
}

impl AppState {
    pub fn new(config: Config, backends: Backends) -> Self {
        Self {
            config,
            auth: backends.auth,
            pages: PageRepository::new(backends.documents),
            uploader: ImageUploader::new(backends.objects),
            sessions: SessionRegistry::new(),
            events: EventBus::new(),
        }
    }

    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let backends = Backends::from_config(&config).context("failed to configure backend")?;
        Ok(Self::new(config, backends))
    }

    /// Directory served under `/uploads`
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.server.uploads_dir)
    }

    pub fn slug(&self) -> &str {
        &self.config.builder.slug
    }

    pub fn title(&self) -> &str {
        &self.config.builder.title
    }

    pub fn markup_policy(&self) -> MarkupPolicy {
        MarkupPolicy::from_sanitize_flag(self.config.builder.sanitize_markup)
    }

    /// Elements of the builder document; a failed or missing load is empty
    pub async fn load_builder_elements(&self) -> Vec<PageElement> {
        match self.pages.load(self.slug()).await {
            Ok(Some(document)) => document.content,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!(slug = %self.slug(), error = %e, "failed to load builder document");
                Vec::new()
            }
        }
    }

    /// Create the edit session for a freshly authenticated user
    pub async fn open_session(&self, user: Session) -> Arc<AdminSession> {
        let key = uuid::Uuid::new_v4().simple().to_string();
        let elements = self.load_builder_elements().await;

        let mut edit = EditSession::new(key.clone(), elements)
            .with_drag_threshold(self.config.builder.drag_threshold)
            .with_markup_policy(self.markup_policy());

        let events = self.events.clone();
        let feed_key = key.clone();
        edit.tree_mut().subscribe(move |change| {
            events.publish(BuilderEvent::new(
                feed_key.clone(),
                EventKind::Change {
                    change: change.clone(),
                },
            ));
        });

        tracing::info!(email = %user.email, session = %key, "admin session opened");
        let admin = Arc::new(AdminSession::new(user.clone(), key, Pipeline::new(edit)));
        self.sessions.insert(user.access_token, admin.clone()).await;
        admin
    }

    /// How long a verified session is trusted without asking the auth service
    pub fn session_check_interval(&self) -> Duration {
        Duration::from_secs(self.config.server.session_check_secs)
    }

    /// Session for the request's cookie. Tokens unknown to this process are
    /// checked with the auth service before a session is opened for them;
    /// known ones are re-checked once their verification is stale.
    pub async fn resolve_session(&self, headers: &HeaderMap) -> Option<Arc<AdminSession>> {
        let token = session_token(headers)?;
        if let Some(admin) = self.sessions.get(&token).await {
            if !admin.needs_check(self.session_check_interval()) {
                return Some(admin);
            }
            let live = self.revalidate(&token, &admin).await;
            return live.then_some(admin);
        }

        match self.auth.get_session(&token).await {
            Ok(Some(user)) => Some(self.open_session(user).await),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(error = %e, "session lookup failed");
                None
            }
        }
    }

    /// Ask the auth service whether `token` is still live. A token it no
    /// longer knows closes the session; a failed lookup only denies this
    /// request.
    async fn revalidate(&self, token: &str, admin: &Arc<AdminSession>) -> bool {
        match self.auth.get_session(token).await {
            Ok(Some(_)) => {
                admin.mark_verified();
                true
            }
            Ok(None) => {
                self.expire(token).await;
                false
            }
            Err(e) => {
                tracing::error!(session = %admin.key, error = %e, "session check failed");
                false
            }
        }
    }

    async fn expire(&self, token: &str) {
        if let Some(admin) = self.sessions.remove(token).await {
            tracing::info!(email = %admin.user.email, session = %admin.key, "admin session expired");
            admin.close().await;
        }
    }

    /// Re-check every stale session and close the ones whose token is gone.
    /// Returns how many were closed.
    pub async fn sweep_sessions(&self) -> usize {
        let interval = self.session_check_interval();
        let mut expired = 0;
        for (token, admin) in self.sessions.entries().await {
            if !admin.needs_check(interval) {
                continue;
            }
            match self.auth.get_session(&token).await {
                Ok(Some(_)) => admin.mark_verified(),
                Ok(None) => {
                    self.expire(&token).await;
                    expired += 1;
                }
                Err(e) => {
                    tracing::warn!(session = %admin.key, error = %e, "session sweep lookup failed");
                }
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_common::AdminAccount;

    #[test]
    fn test_supabase_requires_credentials() {
        let mut config = Config::default();
        config.backend.kind = BackendKind::Supabase;
        assert!(Backends::from_config(&config).is_err());

        config.backend.url = Some("https://x.supabase.co".into());
        config.backend.key = Some("anon".into());
        assert!(Backends::from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_memory_backend_seeds_admins() {
        let mut config = Config::default();
        config.backend.admins.push(AdminAccount {
            email: "admin@marble.test".into(),
            password: "pw".into(),
        });
        let backends = Backends::from_config(&config).unwrap();
        let session = backends
            .auth
            .sign_in_with_password(&Credentials::new("admin@marble.test", "pw"))
            .await
            .unwrap();
        assert_eq!(session.email, "admin@marble.test");
    }
}
