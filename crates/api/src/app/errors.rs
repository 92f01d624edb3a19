//! One mapping layer from domain/infra/auth failures to HTTP responses.
//!
//! Every error body has the shape `{ "message": ..., "status": false, "error": <code> }`.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use eventsphere_auth::{AuthzError, TokenError};
use eventsphere_core::DomainError;
use eventsphere_infra::{DispatchError, StoreError};

pub type ApiResult = Result<axum::response::Response, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        json_error(self.status, self.code, self.message)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "validation_error", message),
            DomainError::InvalidId(_) => Self::new(StatusCode::BAD_REQUEST, "invalid_id", message),
            DomainError::InvariantViolation(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
            }
            DomainError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            DomainError::Conflict(_) => Self::new(StatusCode::CONFLICT, "conflict", message),
            DomainError::Forbidden(_) => Self::forbidden(message),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::not_found(err.to_string()),
            StoreError::AlreadyExists(_) | StoreError::Concurrency(_) => {
                Self::new(StatusCode::CONFLICT, "conflict", err.to_string())
            }
            StoreError::Serialization(_) | StoreError::Backend(_) => {
                tracing::error!(error = %err, "store failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal storage error")
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Domain(e) => e.into(),
            DispatchError::Store(e) => e.into(),
            DispatchError::Serialize(msg) => {
                tracing::error!(error = %msg, "event serialization failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "serialize_error", "internal error")
            }
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        Self::forbidden(err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => {
                tracing::error!(error = %msg, "token signing failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "token_error", "could not issue token")
            }
            other => Self::unauthorized(other.to_string()),
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "message": message.into(),
            "status": false,
            "error": code,
        })),
    )
        .into_response()
}
