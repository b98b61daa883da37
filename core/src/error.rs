//! Error types for the fetcher.
//!
//! # Design
//! The two default failures, transport and JSON parsing, display the fixed
//! `exception` messages verbatim and keep the underlying cause as
//! `source()`. A hook that aborts replaces the default error entirely: its
//! error is carried unmodified in `Hook` and is reachable by downcasting.
//! A non-2xx status is never an error on its own.

use thiserror::Error;

/// Error raised by a hook to abort a call.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Default error messages.
pub mod exception {
    /// Message of a transport-level failure.
    pub const RESPONSE: &str = "[Fetcher]: Network request failed";
    /// Message of a response body that is not valid JSON.
    pub const JSON: &str = "[Fetcher]: Response is not valid JSON";
}

/// Failure category of a [`FetcherError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResourceError,
    JsonTransformError,
    HookError,
    SerializeError,
    DecodeError,
}

/// Errors returned by `PreparedRequest::json`.
#[derive(Debug, Error)]
pub enum FetcherError {
    /// The transport could not complete the request.
    #[error("{}", exception::RESPONSE)]
    Resource(#[source] TransportError),

    /// The response body is not valid JSON.
    #[error("{}", exception::JSON)]
    JsonTransform(#[source] serde_json::Error),

    /// A hook aborted the call with its own error.
    #[error(transparent)]
    Hook(HookError),

    /// The request payload could not be encoded as JSON.
    #[error("request payload could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The response JSON does not match the requested type.
    #[error("response JSON does not match the requested type: {0}")]
    Decode(#[source] serde_json::Error),
}

impl FetcherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetcherError::Resource(_) => ErrorKind::ResourceError,
            FetcherError::JsonTransform(_) => ErrorKind::JsonTransformError,
            FetcherError::Hook(_) => ErrorKind::HookError,
            FetcherError::Serialize(_) => ErrorKind::SerializeError,
            FetcherError::Decode(_) => ErrorKind::DecodeError,
        }
    }

    /// The hook's error, if a hook aborted the call.
    pub fn hook_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            FetcherError::Hook(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    pub fn into_hook_error(self) -> Result<HookError, Self> {
        match self {
            FetcherError::Hook(err) => Ok(err),
            other => Err(other),
        }
    }
}

/// Errors reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    /// The request could not be built from the assembled `RequestInit`.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
