//! # Marble Site
//!
//! HTTP surface of the marble quarry site:
//!
//! - public pages at `/`, `/about` (Ukrainian) and `/en`, `/en/about`
//! - admin login, dashboard and page builder under `/admin-*`
//! - the builder JSON API and its SSE change feed
//! - uploaded images under `/uploads`
//!
//! Anything else redirects to `/`.

pub mod error;
pub mod events;
pub mod pages;
pub mod routes;
pub mod sessions;
pub mod state;

pub use error::ApiError;
pub use events::{BuilderEvent, EventBus, EventKind};
pub use sessions::{AdminSession, SessionRegistry, SESSION_COOKIE};
pub use state::{AppState, Backends};

use axum::routing::{get, post};
use axum::Router;
use routes::{admin, builder, public};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

const BUILDER_API: &str = "/admin-portal/page-builder/api";

/// Lower bound on the background session sweep period
const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(30);

fn builder_api() -> Router<Arc<AppState>> {
    Router::new()
        .route("/state", get(builder::state))
        .route("/canvas", get(builder::canvas))
        .route("/inspector", get(builder::inspector))
        .route("/drag/start", post(builder::drag_start))
        .route("/drag/move", post(builder::drag_move))
        .route("/drag/end", post(builder::drag_end))
        .route("/select", post(builder::select))
        .route("/update", post(builder::update))
        .route("/delete", post(builder::delete))
        .route("/device", post(builder::device))
        .route("/tab", post(builder::tab))
        .route("/upload", post(builder::upload))
        .route("/save", post(builder::save))
        .route("/publish", post(builder::publish))
        .route("/reload", post(builder::reload))
        .route("/events", get(builder::events))
}

/// Build the full application router
pub fn router(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(state.uploads_dir());

    Router::new()
        .route("/", get(public::home_uk))
        .route("/about", get(public::about_uk))
        .route("/en", get(public::home_en))
        .route("/en/about", get(public::about_en))
        .route("/admin-login", get(admin::login_form).post(admin::login))
        .route("/admin-logout", post(admin::logout))
        .route("/admin-portal", get(admin::dashboard))
        .route("/admin-portal/page-builder", get(admin::page_builder))
        .nest(BUILDER_API, builder_api())
        .nest_service("/uploads", uploads)
        .fallback(public::fallback)
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.addr();
    let state = Arc::new(state);
    tokio::spawn(sweep_sessions(state.clone()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "marble site listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Close sessions whose token the auth service has dropped, including ones
/// that never make another request
async fn sweep_sessions(state: Arc<AppState>) {
    let period = state.session_check_interval().max(MIN_SWEEP_PERIOD);
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let expired = state.sweep_sessions().await;
        if expired > 0 {
            let remaining = state.sessions.len().await;
            tracing::info!(expired, remaining, "swept admin sessions");
        }
    }
}
