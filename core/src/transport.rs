//! The network boundary.
//!
//! # Design
//! A `Transport` executes one resolved `HttpRequest` and returns whatever the
//! server answered, including 4xx/5xx. It fails only when no response could be
//! obtained. `UreqTransport` runs ureq's blocking client on tokio's blocking
//! pool so callers never stall the event loop.

use std::future::Future;
use std::time::Duration;

use tracing::{trace, warn};

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Largest response body read before giving up on it.
pub const DEFAULT_BODY_LIMIT: u64 = 64 * 1024 * 1024;

/// ureq-backed transport.
///
/// The agent keeps no cookie jar, so no ambient credentials are forwarded;
/// authentication travels only in the configured headers.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Cap on response body bytes. A body that exceeds it is dropped and the
    /// response is reported with an empty body.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.timeout())
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let agent = self.agent.clone();
        let body_limit = self.body_limit;
        async move {
            tokio::task::spawn_blocking(move || execute_blocking(&agent, body_limit, request))
                .await
                .map_err(|e| TransportError::Worker(e.to_string()))?
        }
    }
}

fn execute_blocking(
    agent: &ureq::Agent,
    body_limit: u64,
    request: HttpRequest,
) -> Result<HttpResponse, TransportError> {
    trace!(method = %request.method, url = %request.url, "transport: sending");
    let headers = &request.headers;
    let result = match (request.method, request.body.as_deref()) {
        (HttpMethod::Get, _) => with_headers(agent.get(&request.url), headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&request.url), headers).call(),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(&request.url), headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(&request.url), headers).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            with_headers(agent.put(&request.url), headers).send(body.as_bytes())
        }
        (HttpMethod::Put, None) => with_headers(agent.put(&request.url), headers).send_empty(),
    };
    let mut response = result.map_err(|e| TransportError::Network(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    // The status already arrived; an unreadable body must not turn the
    // response into a transport failure.
    let body = match response
        .body_mut()
        .with_config()
        .limit(body_limit)
        .read_to_vec()
    {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!(status, error = %e, "transport: response body dropped");
            String::new()
        }
    };

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
