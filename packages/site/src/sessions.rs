//! Signed-in admins and their edit sessions.
//!
//! The auth access token lives in the `marble_session` cookie. Each token maps
//! to one [`AdminSession`]: the render pipeline over the builder document plus
//! a cancellation scope for the uploads it started.

use axum::http::{header, HeaderMap};
use marble_backend::Session;
use marble_editor::Pipeline;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const SESSION_COOKIE: &str = "marble_session";

pub struct AdminSession {
    pub user: Session,
    /// Public key for the change feed; the access token never leaves the cookie
    pub key: String,
    pub pipeline: Mutex<Pipeline>,
    cancel: CancellationToken,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
    /// Last time the auth service confirmed the access token
    verified_at: std::sync::Mutex<Instant>,
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("email", &self.user.email)
            .field("key", &self.key)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl AdminSession {
    pub fn new(user: Session, key: impl Into<String>, pipeline: Pipeline) -> Self {
        Self {
            user,
            key: key.into(),
            pipeline: Mutex::new(pipeline),
            cancel: CancellationToken::new(),
            tasks: std::sync::Mutex::new(Vec::new()),
            verified_at: std::sync::Mutex::new(Instant::now()),
        }
    }

    /// Whether the token has gone unchecked for at least `interval`
    pub fn needs_check(&self, interval: Duration) -> bool {
        match self.verified_at.lock() {
            Ok(at) => at.elapsed() >= interval,
            Err(_) => true,
        }
    }

    pub fn mark_verified(&self) {
        if let Ok(mut at) = self.verified_at.lock() {
            *at = Instant::now();
        }
    }

    /// Token for a task that must stop when the session ends
    pub fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn track(&self, handle: JoinHandle<()>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.retain(|task| !task.is_finished());
            tasks.push(handle);
        }
    }

    /// Wait for every tracked task to finish
    pub async fn settle(&self) {
        let handles: Vec<_> = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(session = %self.key, error = %e, "session task ended abnormally");
            }
        }
    }

    /// Cancel outstanding uploads and forget their tickets
    pub async fn close(&self) {
        self.cancel.cancel();
        let dropped = self.pipeline.lock().await.session_mut().cancel_uploads();
        self.settle().await;
        tracing::info!(email = %self.user.email, dropped, "admin session closed");
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<AdminSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, token: &str) -> Option<Arc<AdminSession>> {
        self.sessions.read().await.get(token).cloned()
    }

    pub async fn insert(&self, token: impl Into<String>, session: Arc<AdminSession>) {
        self.sessions.write().await.insert(token.into(), session);
    }

    pub async fn remove(&self, token: &str) -> Option<Arc<AdminSession>> {
        self.sessions.write().await.remove(token)
    }

    /// Snapshot of every registered token and its session
    pub async fn entries(&self) -> Vec<(String, Arc<AdminSession>)> {
        self.sessions
            .read()
            .await
            .iter()
            .map(|(token, session)| (token.clone(), session.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Access token from the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; marble_session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        headers.insert(header::COOKIE, HeaderValue::from_static("marble_session="));
        assert_eq!(session_token(&headers), None);

        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_verification_window() {
        let session = AdminSession::new(
            Session {
                user_id: "u1".into(),
                email: "admin@marble.test".into(),
                access_token: "t".into(),
            },
            "k",
            Pipeline::new(marble_editor::EditSession::new("k", Vec::new())),
        );
        assert!(!session.needs_check(Duration::from_secs(60)));
        assert!(session.needs_check(Duration::ZERO));
        session.mark_verified();
        assert!(!session.needs_check(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_close_cancels_children() {
        let session = AdminSession::new(
            Session {
                user_id: "u1".into(),
                email: "admin@marble.test".into(),
                access_token: "t".into(),
            },
            "k",
            Pipeline::new(marble_editor::EditSession::new("k", Vec::new())),
        );
        let child = session.child_token();
        session.track(tokio::spawn(async move { child.cancelled().await }));
        assert!(!session.is_closed());

        session.close().await;
        assert!(session.is_closed());
    }

    #[test]
    fn test_cookie_strings() {
        assert!(session_cookie("t").starts_with("marble_session=t;"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
