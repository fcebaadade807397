//! Error types for the todo API client.
//!
//! # Design
//! The server answers every failure with `{"message", "errors"?}`. Parse
//! methods decode that body and pick a variant from the status code, so
//! callers can match on what went wrong and still show the server's message.
//! `Transport` is never produced by the core itself; hosts wrap their own
//! network failures in it so the board can tell them apart.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Validation messages keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 400: the request body was rejected. `errors` is empty when the body
    /// could not be parsed at all.
    #[error("validation failed: {message}")]
    Validation { message: String, errors: FieldErrors },

    /// 401: no API key was sent.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403: the API key was wrong.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 404: the requested todo does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// 409: the item changed underneath the request.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other unexpected status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never got a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// The message the server sent, if this error came from a response.
    /// Empty when the response had no JSON body.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::Http { message, .. } => Some(message),
            ApiError::Transport(_) | ApiError::Deserialization(_) | ApiError::Serialization(_) => None,
        }
    }

    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let ErrorBody { message, errors } = serde_json::from_str(body).unwrap_or_default();
        match status {
            400 => ApiError::Validation {
                message,
                errors: errors.unwrap_or_default(),
            },
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            _ => ApiError::Http { status, message },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Option<FieldErrors>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_keeps_field_errors() {
        let err = ApiError::from_response(
            400,
            r#"{"message":"One or more validation errors occurred.","errors":{"title":["The title field is required."]}}"#,
        );
        let ApiError::Validation { message, errors } = err else {
            panic!("expected validation error");
        };
        assert_eq!(message, "One or more validation errors occurred.");
        assert_eq!(errors["title"], vec!["The title field is required."]);
    }

    #[test]
    fn non_json_body_leaves_message_empty() {
        let err = ApiError::from_response(502, "<html>bad gateway</html>");
        assert_eq!(
            err,
            ApiError::Http {
                status: 502,
                message: String::new()
            }
        );
        assert_eq!(err.server_message(), Some(""));
    }

    #[test]
    fn transport_has_no_server_message() {
        assert_eq!(ApiError::Transport("refused".into()).server_message(), None);
    }
}
