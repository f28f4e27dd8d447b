use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use glossa_sdk::{ErrorClass, GlossaError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Glossa(#[from] GlossaError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Glossa(e) => match e.class() {
                ErrorClass::NotFound => StatusCode::NOT_FOUND,
                ErrorClass::Validation => StatusCode::BAD_REQUEST,
                ErrorClass::Forbidden => StatusCode::FORBIDDEN,
                ErrorClass::Conflict => StatusCode::CONFLICT,
                ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_error_class() {
        let not_found = ServerError::from(GlossaError::NotFound("branch".into()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict = ServerError::from(GlossaError::Conflict("default".into()));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let validation = ServerError::from(GlossaError::Validation("slug".into()));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            ServerError::Unauthorized("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
