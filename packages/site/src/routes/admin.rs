//! Login, logout and the admin portal pages.

use super::AdminPage;
use crate::pages::{builder_page, dashboard_page, login_page, DashboardStats};
use crate::sessions::{clear_session_cookie, session_cookie, session_token};
use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use marble_backend::{BackendError, Credentials};
use marble_evaluator::{render_palette, to_html, HtmlOptions};
use marble_model::list_widgets;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login_form(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if state.resolve_session(&headers).await.is_some() {
        return Redirect::to("/admin-portal").into_response();
    }
    Html(login_page(None, "")).into_response()
}

pub async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    let credentials = Credentials::new(form.email.trim(), form.password);
    match state.auth.sign_in_with_password(&credentials).await {
        Ok(user) => {
            let cookie = session_cookie(&user.access_token);
            tracing::info!(email = %user.email, "admin signed in");
            state.open_session(user).await;
            ([(header::SET_COOKIE, cookie)], Redirect::to("/admin-portal")).into_response()
        }
        Err(BackendError::AuthFailure(message)) => {
            tracing::warn!(email = %credentials.email, "sign-in rejected");
            (
                StatusCode::UNAUTHORIZED,
                Html(login_page(Some(&message), &credentials.email)),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "sign-in failed");
            (
                StatusCode::BAD_GATEWAY,
                Html(login_page(Some("Sign-in is unavailable right now"), &credentials.email)),
            )
                .into_response()
        }
    }
}

/// End the session: cancel its uploads, then sign out upstream
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Some(admin) = state.sessions.remove(&token).await {
            admin.close().await;
        }
        if let Err(e) = state.auth.sign_out(&token).await {
            tracing::error!(error = %e, "sign-out failed");
        }
    }
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/admin-login"),
    )
        .into_response()
}

pub async fn dashboard(State(state): State<Arc<AppState>>, AdminPage(admin): AdminPage) -> Html<String> {
    let page_count = match state.pages.list_slugs().await {
        Ok(slugs) => Some(slugs.len()),
        Err(e) => {
            tracing::error!(error = %e, "failed to list pages");
            None
        }
    };
    let updated_at = match state.pages.load(state.slug()).await {
        Ok(document) => document.map(|d| d.updated_at),
        Err(e) => {
            tracing::error!(error = %e, "failed to load builder document");
            None
        }
    };
    let element_count = admin.pipeline.lock().await.session().tree().element_count();

    Html(dashboard_page(&DashboardStats {
        email: admin.user.email.clone(),
        page_count,
        slug: state.slug().to_string(),
        element_count,
        updated_at,
    }))
}

pub async fn page_builder(AdminPage(admin): AdminPage) -> Html<String> {
    let compact = HtmlOptions::compact();
    let palette = to_html(&render_palette(list_widgets()), &compact);

    let mut pipeline = admin.pipeline.lock().await;
    let canvas = pipeline.canvas_html(&compact);
    let session = pipeline.session();
    let inspector = to_html(&session.render_inspector(), &compact);

    Html(builder_page(
        &admin.user.email,
        session.device(),
        &palette,
        &canvas,
        &inspector,
    ))
}
