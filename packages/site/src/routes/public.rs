//! Public marketing pages in Ukrainian (root) and English (`/en`).

use crate::pages::{about_page, public_page, static_hero, Lang};
use crate::state::AppState;
use axum::extract::State;
use axum::response::{Html, Redirect};
use marble_evaluator::{to_html, Canvas, Device, HtmlOptions};
use std::sync::Arc;

pub async fn home_uk(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(home(&state, Lang::Uk).await)
}

pub async fn home_en(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(home(&state, Lang::En).await)
}

pub async fn about_uk() -> Html<String> {
    Html(about_page(Lang::Uk))
}

pub async fn about_en() -> Html<String> {
    Html(about_page(Lang::En))
}

/// Unmatched paths go home
pub async fn fallback() -> Redirect {
    Redirect::to("/")
}

/// The published builder document, or the static hero when there is none
async fn home(state: &AppState, lang: Lang) -> String {
    let document = match state.pages.load(state.slug()).await {
        Ok(document) => document,
        Err(e) => {
            tracing::error!(slug = %state.slug(), error = %e, "failed to load home page");
            None
        }
    };

    match document {
        Some(document) if !document.content.is_empty() => {
            let node = Canvas::published(Device::Desktop)
                .with_markup_policy(state.markup_policy())
                .render(&document.content);
            public_page(lang, &document.title, &to_html(&node, &HtmlOptions::compact()))
        }
        _ => public_page(lang, state.title(), &static_hero(lang)),
    }
}
