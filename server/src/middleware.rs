//! Outer layers that keep every failure a JSON `{"message"}` body.
//!
//! # Design
//! Handlers already return [`ApiError`] for the failures they anticipate.
//! These layers cover the rest: framework rejections and the fallback 404/405
//! come back with plain-text or empty bodies and are rewritten by
//! [`normalize_error_body`]; a panic anywhere below is turned into a generic
//! 500 by [`handle_panic`] under `tower_http::catch_panic`.

use std::any::Any;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ApiError, ErrorBody};

pub async fn normalize_error_body(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(response.headers()) {
        return response;
    }

    let message = status.canonical_reason().unwrap_or("Request failed").to_string();
    tracing::debug!(status = status.as_u16(), "rewriting non-JSON error body");
    let (mut parts, _body) = response.into_parts();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    (parts, Json(ErrorBody::new(message))).into_response()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::Internal.into_response()
}
