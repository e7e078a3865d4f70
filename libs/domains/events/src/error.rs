use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("request body must be a JSON object")]
    MalformedBody,

    #[error("bad visitor")]
    InvalidVisitor,

    #[error("bad payload")]
    InvalidPayload { errors: Vec<String> },

    #[error("Invalid event schema: {0}")]
    Schema(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Failed to read event schema: {0}")]
    Io(#[from] std::io::Error),
}

pub type EventResult<T> = Result<T, EventError>;

impl EventError {
    /// Metrics label for input rejected before storage.
    pub fn rejection_reason(&self) -> Option<&'static str> {
        match self {
            EventError::MalformedBody => Some("malformed_body"),
            EventError::InvalidVisitor => Some("bad_visitor"),
            EventError::InvalidPayload { .. } => Some("bad_payload"),
            _ => None,
        }
    }
}

/// Convert EventError to AppError for standardized error responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::MalformedBody | EventError::InvalidVisitor => {
                AppError::BadRequest(err.to_string())
            }
            EventError::InvalidPayload { errors } => AppError::Validation {
                message: "bad payload".to_string(),
                details: errors,
            },
            EventError::Schema(msg) => AppError::InternalServerError(msg),
            EventError::Database(e) => AppError::Database(e),
            EventError::Io(e) => AppError::Io(e),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
