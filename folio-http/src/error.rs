use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_core::FolioError;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct AppError(pub FolioError);

impl From<FolioError> for AppError {
    fn from(e: FolioError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            FolioError::NoToken | FolioError::InvalidToken | FolioError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            FolioError::TitleNotFound(_)
            | FolioError::ChapterNotFound { .. }
            | FolioError::NonCanonicalChapter { .. } => StatusCode::NOT_FOUND,
            FolioError::EmailTaken => StatusCode::CONFLICT,
            FolioError::Invalid(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
