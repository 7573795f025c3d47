//! API error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use pledge_store::StoreError;
use pledge_workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error("session is handling another request")]
    SessionBusy,

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("admin endpoints are disabled")]
    AdminDisabled,

    #[error("invalid admin token")]
    AdminUnauthorized,

    #[error("confirmation phrase mismatch")]
    AdminConfirmation,

    #[error("server error: {0}")]
    Server(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownSession(_) => StatusCode::NOT_FOUND,
            ApiError::SessionBusy => StatusCode::CONFLICT,
            ApiError::Workflow(WorkflowError::AlreadySigned(_)) => StatusCode::CONFLICT,
            ApiError::Workflow(WorkflowError::Store(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Workflow(WorkflowError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            // remaining workflow errors are user-input problems
            ApiError::Workflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::AdminDisabled => StatusCode::FORBIDDEN,
            ApiError::AdminUnauthorized => StatusCode::UNAUTHORIZED,
            ApiError::AdminConfirmation => StatusCode::BAD_REQUEST,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
