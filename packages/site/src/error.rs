use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use marble_backend::BackendError;
use marble_editor::EditorError;
use serde_json::json;

/// Errors returned by the builder API as `{ "error": ... }` bodies
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not signed in")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Editor(EditorError::NothingSelected) => StatusCode::CONFLICT,
            ApiError::Editor(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Backend(BackendError::AuthFailure(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Backend(BackendError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "builder request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(BackendError::SaveFailure("down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(EditorError::NothingSelected).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_rejected_mutations_are_unprocessable() {
        use marble_editor::MutationError;

        let missing_parent = EditorError::Mutation(MutationError::ParentNotFound("gone".into()));
        assert_eq!(
            ApiError::from(missing_parent).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
