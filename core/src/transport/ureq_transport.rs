//! Ureq-based transport.
//!
//! ureq is synchronous, so each exchange runs on tokio's blocking pool and
//! the calling task is suspended until it completes. The transport must be
//! used from within a tokio runtime.

use std::io::Read as _;
use std::time::Duration;

use tracing::debug;
use ureq::http;

use crate::error::TransportError;
use crate::http::{RequestInit, Response};
use crate::transport::Transport;

/// A [`Transport`] backed by a [`ureq::Agent`].
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Option<Duration>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Transport whose requests time out after `timeout` unless the request
    /// sets its own.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            agent: agent(timeout, None),
            timeout,
        }
    }

    fn agent_for(&self, init: &RequestInit) -> ureq::Agent {
        if init.timeout.is_none() && init.max_redirects.is_none() {
            return self.agent.clone();
        }
        agent(init.timeout.or(self.timeout), init.max_redirects)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn agent(timeout: Option<Duration>, max_redirects: Option<u32>) -> ureq::Agent {
    let mut config = ureq::Agent::config_builder()
        // Status codes are data for the fetcher, never transport errors.
        .http_status_as_error(false)
        .timeout_global(timeout);
    if let Some(max_redirects) = max_redirects {
        config = config.max_redirects(max_redirects);
    }
    config.build().new_agent()
}

impl Transport for UreqTransport {
    async fn perform(&self, url: &str, init: &RequestInit) -> Result<Response, TransportError> {
        let agent = self.agent_for(init);
        let url = url.to_owned();
        let init = init.clone();

        tokio::task::spawn_blocking(move || exchange(&agent, &url, &init))
            .await
            .map_err(|e| TransportError::Other(Box::new(e)))?
    }
}

fn exchange(
    agent: &ureq::Agent,
    url: &str,
    init: &RequestInit,
) -> Result<Response, TransportError> {
    let mut builder = http::Request::builder()
        .method(init.method.as_str())
        .uri(url);
    for (name, value) in &init.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let result = match &init.body {
        Some(body) => {
            let req = builder
                .body(body.clone().into_bytes())
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            agent.run(req)
        }
        None => {
            let req = builder
                .body(())
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            agent.run(req)
        }
    };

    match result {
        Ok(resp) => Ok(convert_response(url, resp)),
        Err(ureq::Error::Timeout(_)) => Err(TransportError::Timeout),
        Err(ureq::Error::HostNotFound) => {
            Err(TransportError::Connection("host not found".to_owned()))
        }
        Err(ureq::Error::Io(e)) => Err(TransportError::Connection(e.to_string())),
        Err(e) => Err(TransportError::Other(Box::new(e))),
    }
}

fn convert_response(url: &str, response: http::Response<ureq::Body>) -> Response {
    let (parts, body) = response.into_parts();

    let mut body_bytes = Vec::new();
    let read_error = match body.into_reader().read_to_end(&mut body_bytes) {
        Ok(_) => None,
        Err(e) => {
            debug!(%url, error = %e, "response body interrupted");
            Some(e.to_string())
        }
    };

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    Response {
        url: url.to_owned(),
        status: parts.status.as_u16(),
        headers,
        body: body_bytes,
        read_error,
    }
}
