//! HTTP error responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::debug;

use crate::auth::AuthError;
use crate::intake::IntakeError;

/// Field reported when the request body itself could not be read.
pub const BODY_FIELD: &str = "body";

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

/// Everything a handler can answer with besides success.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{message}")]
    PayloadTooLarge { field: String, message: String },

    /// Detail is logged by the service, never returned.
    #[error("Service temporarily unavailable, please retry")]
    StorageUnavailable,

    #[error("{0}")]
    Unauthorized(AuthError),

    #[error("{0}")]
    Forbidden(AuthError),

    #[error("Inquiry not found")]
    NotFound,
}

impl ApiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } | Self::PayloadTooLarge { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::Invalid(v) => Self::Validation {
                field: v.field().to_string(),
                message: v.to_string(),
            },
            IntakeError::TooLarge(v) => Self::PayloadTooLarge {
                field: v.field().to_string(),
                message: v.to_string(),
            },
            IntakeError::StorageUnavailable(_) | IntakeError::WriteTimedOut { .. } => {
                Self::StorageUnavailable
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken | AuthError::InvalidToken => Self::Unauthorized(e),
            AuthError::Forbidden => Self::Forbidden(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(
            status = %rejection.status(),
            reason = %rejection.body_text(),
            "Rejected request body"
        );
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge {
                field: BODY_FIELD.to_string(),
                message: "Request body too large".to_string(),
            }
        } else {
            Self::validation(BODY_FIELD, rejection.body_text())
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation("query", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = ErrorBody {
            error: &message,
            field: self.field(),
        };
        let mut response = (self.status(), Json(body)).into_response();
        if matches!(self, Self::Unauthorized(_)) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
