use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::solver::SolveError;

const INTERNAL_MESSAGE: &str = "An internal server error occurred.";

/// JSON error body: `{ "error": "..." }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors the HTTP layer reports to clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    BadRequest(String),
    /// Body refused before parsing (too large, wrong content type).
    #[error("{1}")]
    Rejected(StatusCode, String),
    #[error("API key is not configured.")]
    MissingApiKey,
    /// Details are logged, never sent.
    #[error("{}", INTERNAL_MESSAGE)]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(status, _) => *status,
            ApiError::MissingApiKey | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SolveError> for ApiError {
    fn from(err: SolveError) -> Self {
        match err {
            SolveError::MissingApiKey => ApiError::MissingApiKey,
            SolveError::MissingInput => ApiError::BadRequest(err.to_string()),
            SolveError::InvalidImage(e) => ApiError::BadRequest(e.to_string()),
            SolveError::Generate(e) => {
                error!(error = %e, "solve failed");
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                ApiError::BadRequest(rejection.body_text())
            }
            other => ApiError::Rejected(other.status(), other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
