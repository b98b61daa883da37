//! HTTP values exchanged with a [`Transport`](crate::transport::Transport).
//!
//! # Design
//! Requests and responses are plain data. The fetcher assembles a
//! `RequestInit` and hands it to the transport together with the final URL;
//! the transport answers with a `Response` whose body has already been read.
//! All fields use owned types so values can be handed to hooks and moved
//! across tasks without lifetime concerns.

use std::fmt;
use std::io;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::options::FetchOptions;

/// Header list as ordered `(name, value)` pairs.
pub type Headers = Vec<(String, String)>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fully merged request handed to the transport.
///
/// Built by `Fetcher::build_request` and, when configured, rewritten by the
/// `on_before_request` hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInit {
    pub method: Method,
    pub headers: Headers,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
    pub max_redirects: Option<u32>,
}

impl RequestInit {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: None,
            timeout: None,
            max_redirects: None,
        }
    }

    /// Shallow-merge `layer` on top of `self`: every field set in `layer`
    /// replaces the current value as a whole.
    pub fn overlay(&mut self, layer: &FetchOptions) {
        if let Some(headers) = &layer.headers {
            self.headers = headers.clone();
        }
        if let Some(timeout) = layer.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(max_redirects) = layer.max_redirects {
            self.max_redirects = Some(max_redirects);
        }
    }

    /// Case-insensitive header lookup returning the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A response as returned by the transport, body fully read.
///
/// Once status and headers have arrived the exchange counts as completed.
/// A failure while reading the body afterwards is kept in `read_error` and
/// reported by [`json`](Self::json), not by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub headers: Headers,
    /// Bytes received, possibly truncated when `read_error` is set.
    pub body: Vec<u8>,
    pub read_error: Option<String>,
}

impl Response {
    /// `true` when the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        if let Some(reason) = &self.read_error {
            return Err(serde_json::Error::io(io::Error::other(reason.clone())));
        }
        serde_json::from_slice(&self.body)
    }

    /// Body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
