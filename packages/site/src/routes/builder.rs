//! JSON API behind the page builder.
//!
//! Every handler works on the caller's own edit session. Gestures and field
//! edits are applied synchronously under the session lock; uploads run as
//! spawned tasks tied to the session's cancellation scope and report back
//! through the change feed.

use super::Admin;
use crate::error::ApiError;
use crate::events::{session_stream, sse_response, BuilderEvent, EventKind};
use crate::sessions::AdminSession;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use marble_backend::SaveMode;
use marble_editor::{DragSource, DropTarget, MutationResult, Point, UploadOutcome, UploadTicket};
use marble_evaluator::{to_html, Device, FieldGroup, HtmlOptions, InspectorTab};
use marble_model::PageElement;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub session: String,
    pub version: u64,
    pub selection: Option<String>,
    pub device: Device,
    pub tab: InspectorTab,
    pub drag: &'static str,
    pub element_count: usize,
    pub pending_uploads: usize,
    pub elements: Vec<PageElement>,
}

async fn snapshot(admin: &AdminSession) -> StateResponse {
    let pipeline = admin.pipeline.lock().await;
    let session = pipeline.session();
    StateResponse {
        session: admin.key.clone(),
        version: session.tree().version(),
        selection: session.selection().map(str::to_string),
        device: session.device(),
        tab: session.tab(),
        drag: session.drag().state().phase(),
        element_count: session.tree().element_count(),
        pending_uploads: session.pending_uploads(),
        elements: session.tree().to_vec(),
    }
}

pub async fn state(Admin(admin): Admin) -> Json<StateResponse> {
    Json(snapshot(&admin).await)
}

pub async fn canvas(Admin(admin): Admin) -> Html<String> {
    Html(admin.pipeline.lock().await.canvas_html(&HtmlOptions::compact()))
}

pub async fn inspector(Admin(admin): Admin) -> Html<String> {
    let pipeline = admin.pipeline.lock().await;
    Html(to_html(&pipeline.session().render_inspector(), &HtmlOptions::compact()))
}

#[derive(Debug, Deserialize)]
pub struct DragStartRequest {
    pub source: DragSource,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct PointerRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct DragEndRequest {
    pub target: DropTarget,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragResponse {
    pub accepted: bool,
    pub dragging: bool,
    pub phase: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropResponse {
    pub created: Option<String>,
    pub version: u64,
}

pub async fn drag_start(Admin(admin): Admin, Json(req): Json<DragStartRequest>) -> Json<DragResponse> {
    let mut pipeline = admin.pipeline.lock().await;
    let session = pipeline.session_mut();
    let accepted = session.pointer_down(&req.source, Point::new(req.x, req.y));
    Json(DragResponse {
        accepted,
        dragging: session.drag().is_dragging(),
        phase: session.drag().state().phase(),
    })
}

pub async fn drag_move(Admin(admin): Admin, Json(req): Json<PointerRequest>) -> Json<DragResponse> {
    let mut pipeline = admin.pipeline.lock().await;
    let session = pipeline.session_mut();
    let accepted = session.pointer_move(Point::new(req.x, req.y));
    Json(DragResponse {
        accepted,
        dragging: session.drag().is_dragging(),
        phase: session.drag().state().phase(),
    })
}

pub async fn drag_end(
    Admin(admin): Admin,
    Json(req): Json<DragEndRequest>,
) -> Result<Json<DropResponse>, ApiError> {
    let mut pipeline = admin.pipeline.lock().await;
    let session = pipeline.session_mut();
    let created = session.pointer_up(req.target)?;
    Ok(Json(DropResponse {
        created,
        version: session.tree().version(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub selection: Option<String>,
}

pub async fn select(Admin(admin): Admin, Json(req): Json<SelectRequest>) -> Json<SelectResponse> {
    let mut pipeline = admin.pipeline.lock().await;
    let session = pipeline.session_mut();
    session.select(req.id.as_deref());
    Json(SelectResponse {
        selection: session.selection().map(str::to_string),
    })
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub group: FieldGroup,
    pub field: String,
    pub value: String,
}

/// One inspector keystroke: a single-field patch on the selection
pub async fn update(
    Admin(admin): Admin,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<MutationResult>, ApiError> {
    let mut pipeline = admin.pipeline.lock().await;
    let result = pipeline
        .session_mut()
        .edit_field(req.group, &req.field, &req.value)?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    /// Defaults to the selection
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub version: u64,
}

pub async fn delete(
    Admin(admin): Admin,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut pipeline = admin.pipeline.lock().await;
    let session = pipeline.session_mut();
    let deleted = match req.id {
        Some(id) => session.delete(&id),
        None => session.delete_selected()?,
    };
    Ok(Json(DeleteResponse {
        deleted,
        version: session.tree().version(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeviceRequest {
    pub device: Device,
}

pub async fn device(Admin(admin): Admin, Json(req): Json<DeviceRequest>) -> Json<StateResponse> {
    admin.pipeline.lock().await.session_mut().set_device(req.device);
    Json(snapshot(&admin).await)
}

#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub tab: InspectorTab,
}

pub async fn tab(Admin(admin): Admin, Json(req): Json<TabRequest>) -> StatusCode {
    admin.pipeline.lock().await.session_mut().set_tab(req.tab);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    pub field: String,
    #[serde(default = "default_group")]
    pub group: FieldGroup,
    pub file_name: String,
    /// Defaults to the selection
    #[serde(default)]
    pub element_id: Option<String>,
}

fn default_group() -> FieldGroup {
    FieldGroup::Content
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ticket: UploadTicket,
}

/// Accept the raw file body and upload it in the background. The result
/// arrives on the change feed as `uploaded` or `alert`.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Admin(admin): Admin,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty upload".to_string()));
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let ticket = {
        let mut pipeline = admin.pipeline.lock().await;
        let session = pipeline.session_mut();
        let element_id = match query.element_id {
            Some(id) => id,
            None => session
                .selection()
                .map(str::to_string)
                .ok_or(marble_editor::EditorError::NothingSelected)?,
        };
        if !session.tree().contains(&element_id) {
            return Err(ApiError::BadRequest(format!("unknown element {}", element_id)));
        }
        session.begin_upload(&element_id, query.group, &query.field)
    };

    spawn_upload(
        state,
        admin.clone(),
        ticket,
        query.file_name,
        body.to_vec(),
        content_type,
    );
    Ok((StatusCode::ACCEPTED, Json(UploadResponse { ticket })))
}

fn spawn_upload(
    state: Arc<AppState>,
    admin: Arc<AdminSession>,
    ticket: UploadTicket,
    file_name: String,
    bytes: Vec<u8>,
    content_type: Option<String>,
) {
    let cancel = admin.child_token();
    let task_admin = admin.clone();
    let handle = tokio::spawn(async move {
        let admin = task_admin;
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::warn!(session = %admin.key, ticket, "upload cancelled");
                return;
            }
            result = state.uploader.upload(&file_name, bytes, content_type.as_deref()) => result,
        };

        let outcome = admin
            .pipeline
            .lock()
            .await
            .session_mut()
            .finish_upload(ticket, result.map_err(|e| e.to_string()));
        match outcome {
            Ok(UploadOutcome::Applied { element_id, url }) => state
                .events
                .publish(BuilderEvent::new(admin.key.clone(), EventKind::Uploaded { element_id, url })),
            Ok(UploadOutcome::Failed { message }) => state.events.publish(BuilderEvent::alert(
                admin.key.clone(),
                format!("Error uploading image: {}", message),
            )),
            Ok(UploadOutcome::Discarded) => {}
            Err(e) => tracing::warn!(session = %admin.key, error = %e, "upload result dropped"),
        }
    });
    admin.track(handle);
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub slug: String,
    pub mode: &'static str,
    pub element_count: usize,
    pub updated_at: DateTime<Utc>,
}

async fn save_with(state: &AppState, admin: &AdminSession, mode: SaveMode) -> Result<Json<SaveResponse>, ApiError> {
    let elements = admin.pipeline.lock().await.session().tree().to_vec();
    match state.pages.save(state.slug(), state.title(), &elements, mode).await {
        Ok(document) => {
            state.events.publish(BuilderEvent::new(
                admin.key.clone(),
                EventKind::Saved {
                    slug: document.slug.clone(),
                    mode: mode.as_str().to_string(),
                    updated_at: document.updated_at,
                },
            ));
            Ok(Json(SaveResponse {
                slug: document.slug,
                mode: mode.as_str(),
                element_count: document.content.len(),
                updated_at: document.updated_at,
            }))
        }
        Err(e) => {
            state
                .events
                .publish(BuilderEvent::alert(admin.key.clone(), format!("Error saving page: {}", e)));
            Err(e.into())
        }
    }
}

pub async fn save(State(state): State<Arc<AppState>>, Admin(admin): Admin) -> Result<Json<SaveResponse>, ApiError> {
    save_with(&state, &admin, SaveMode::Draft).await
}

pub async fn publish(State(state): State<Arc<AppState>>, Admin(admin): Admin) -> Result<Json<SaveResponse>, ApiError> {
    save_with(&state, &admin, SaveMode::Publish).await
}

/// Discard local edits and reload the stored document
pub async fn reload(State(state): State<Arc<AppState>>, Admin(admin): Admin) -> Json<StateResponse> {
    let elements = state.load_builder_elements().await;
    admin.pipeline.lock().await.session_mut().load(elements);
    Json(snapshot(&admin).await)
}

pub async fn events(
    State(state): State<Arc<AppState>>,
    Admin(admin): Admin,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let rx = state.events.subscribe();
    let version = admin.pipeline.lock().await.session().tree().version();
    tracing::info!(session = %admin.key, "change feed opened");
    sse_response(session_stream(admin.key.clone(), version, rx))
}
