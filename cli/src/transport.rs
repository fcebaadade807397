//! Executes core `HttpRequest`s over `ureq`.

use std::time::Duration;

use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use ureq::{Agent, RequestBuilder};

pub struct Transport {
    agent: Agent,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    pub fn new() -> Self {
        // Status codes are interpreted by the core client, not by ureq.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(10)))
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = req.method.as_str(), url = %req.path, "sending request");
        let body = req.body.unwrap_or_default();
        let result = match req.method {
            HttpMethod::Get => with_headers(self.agent.get(&req.path), &req.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&req.path), &req.headers).call(),
            HttpMethod::Post => with_headers(self.agent.post(&req.path), &req.headers).send(body.as_bytes()),
            HttpMethod::Put => with_headers(self.agent.put(&req.path), &req.headers).send(body.as_bytes()),
        };
        let mut response = result.map_err(|err| {
            tracing::warn!(error = %err, "request failed before a response arrived");
            ApiError::Transport(err.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        tracing::debug!(status, "received response");
        Ok(HttpResponse::new(status, body))
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}
