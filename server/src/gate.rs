//! Shared-secret gate in front of every route.
//!
//! # Design
//! Runs as `axum::middleware::from_fn_with_state` with an [`ApiKeyGate`]
//! built from [`crate::config::AppConfig`] at startup. Preflight requests and
//! the documentation/health prefixes pass untouched; everything else needs an
//! `X-API-KEY` header equal to the configured key.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Path prefixes reachable without a key, matched ASCII case-insensitively.
pub const OPEN_PATH_PREFIXES: &[&str] = &["/swagger", "/health"];

#[derive(Clone, Debug)]
pub struct ApiKeyGate {
    key: Arc<str>,
}

impl ApiKeyGate {
    pub fn new(key: &str) -> Self {
        Self { key: Arc::from(key) }
    }

    pub fn check(&self, method: &Method, path: &str, headers: &HeaderMap) -> Result<(), ApiError> {
        if *method == Method::OPTIONS || is_open_path(path) {
            return Ok(());
        }
        let presented = headers.get(API_KEY_HEADER).ok_or(ApiError::MissingApiKey)?;
        if presented.as_bytes() != self.key.as_bytes() {
            return Err(ApiError::InvalidApiKey);
        }
        Ok(())
    }
}

fn is_open_path(path: &str) -> bool {
    OPEN_PATH_PREFIXES.iter().any(|prefix| {
        path.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

pub async fn require_api_key(
    State(gate): State<ApiKeyGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    gate.check(request.method(), request.uri().path(), request.headers())?;
    Ok(next.run(request).await)
}
