use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use circa_core::error::{ServiceError, SessionError};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Failures that end a request with a non-2xx status.
///
/// Generation failures are normally not errors at this level; the generate
/// handler reports them in the response body.
#[derive(Debug)]
pub enum ApiError {
    Session(SessionError),
    Internal(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Session(err) => write!(f, "{}", err),
            ApiError::Internal(message) => write!(f, "Internal error: {}", message),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Session(SessionError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Session(SessionError::InvalidPhase { .. }) => StatusCode::CONFLICT,
            ApiError::Session(SessionError::Service(ServiceError::Timeout { .. })) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ApiError::Session(SessionError::Service(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Session(SessionError::Generation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
