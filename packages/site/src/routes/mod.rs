pub mod admin;
pub mod builder;
pub mod public;

use crate::error::ApiError;
use crate::sessions::AdminSession;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Redirect;
use std::sync::Arc;

/// Signed-in admin for API routes; rejects with 401
pub struct Admin(pub Arc<AdminSession>);

/// Signed-in admin for pages; rejects by redirecting to the login form
pub struct AdminPage(pub Arc<AdminSession>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        state
            .resolve_session(&parts.headers)
            .await
            .map(Admin)
            .ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminPage {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        state
            .resolve_session(&parts.headers)
            .await
            .map(AdminPage)
            .ok_or_else(|| Redirect::to("/admin-login"))
    }
}
