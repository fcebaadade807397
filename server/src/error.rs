//! HTTP error type for the API layer.
//!
//! # Design
//! Every expected failure is an `ApiError` variant returned through `Result`;
//! handlers never build error responses by hand. `IntoResponse` is the single
//! status-code table and always writes `{"message": ..}` (plus `errors` for
//! validation failures). Store errors are logged with their source here and
//! reach the client only as a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::repository::StoreError;
use crate::validation::FieldErrors;

pub const VALIDATION_MESSAGE: &str = "One or more validation errors occurred.";
pub const CONFLICT_MESSAGE: &str = "A concurrency error occurred while processing your request.";
pub const DATABASE_MESSAGE: &str = "A database error occurred while processing your request.";
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Body of every non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<std::collections::BTreeMap<String, Vec<String>>>)]
    pub errors: Option<FieldErrors>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", VALIDATION_MESSAGE)]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("API Key was not provided.")]
    MissingApiKey,

    #[error("Unauthorized client.")]
    InvalidApiKey,

    #[error("{}", CONFLICT_MESSAGE)]
    Conflict(#[source] StoreError),

    #[error("{}", DATABASE_MESSAGE)]
    Store(#[source] StoreError),

    #[error("{}", INTERNAL_MESSAGE)]
    Internal,
}

impl ApiError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!("{entity} with ID {id} not found."))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MissingApiKey => StatusCode::UNAUTHORIZED,
            ApiError::InvalidApiKey => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => ApiError::Conflict(err),
            StoreError::Database(_) => ApiError::Store(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Conflict(source) | ApiError::Store(source) => {
                tracing::error!(error = %source, status = status.as_u16(), "store failure");
            }
            _ if status.is_server_error() => {
                tracing::error!(status = status.as_u16(), "{self}");
            }
            _ => {
                tracing::warn!(status = status.as_u16(), "{self}");
            }
        }
        let body = match self {
            ApiError::Validation(errors) => ErrorBody {
                message: VALIDATION_MESSAGE.to_string(),
                errors: Some(errors),
            },
            other => ErrorBody::new(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
