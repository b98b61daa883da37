//! Lifecycle hooks invoked around a call.
//!
//! `on_before_request` runs while the request is assembled and may replace
//! the URL and init wholesale. The other four run during dispatch and answer
//! with a [`Flow`]: `Continue` keeps the default handling, `Abort` ends the
//! call with the hook's own error.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::HookError;
use crate::http::{RequestInit, Response};

/// Decision returned by a dispatch hook.
#[derive(Debug)]
pub enum Flow {
    Continue,
    Abort(HookError),
}

impl Flow {
    /// Abort with any error type.
    pub fn abort(err: impl Into<HookError>) -> Self {
        Flow::Abort(err.into())
    }
}

impl<E: Into<HookError>> From<Result<(), E>> for Flow {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Flow::Continue,
            Err(err) => Flow::Abort(err.into()),
        }
    }
}

/// Argument of `on_json_transform_error`.
#[derive(Debug, Clone, Copy)]
pub struct JsonErrorContext<'a> {
    pub response: &'a Response,
}

/// Argument of `on_response_not_ok_error` and `on_response_ok`.
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub response: &'a Response,
    pub data: &'a Value,
}

type BeforeRequestFn = dyn Fn(String, RequestInit) -> (String, RequestInit) + Send + Sync;
type FetchResourceErrorFn = dyn Fn(&str, &RequestInit) -> Flow + Send + Sync;
type JsonTransformErrorFn = dyn for<'a> Fn(JsonErrorContext<'a>) -> Flow + Send + Sync;
type ResponseFn = dyn for<'a> Fn(ResponseContext<'a>) -> Flow + Send + Sync;

/// The set of hooks configured on a fetcher. Every hook is optional.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) on_before_request: Option<Arc<BeforeRequestFn>>,
    pub(crate) on_fetch_resource_error: Option<Arc<FetchResourceErrorFn>>,
    pub(crate) on_json_transform_error: Option<Arc<JsonTransformErrorFn>>,
    pub(crate) on_response_not_ok_error: Option<Arc<ResponseFn>>,
    pub(crate) on_response_ok: Option<Arc<ResponseFn>>,
}

impl Hooks {
    /// No hooks configured.
    pub const EMPTY: Self = Self {
        on_before_request: None,
        on_fetch_resource_error: None,
        on_json_transform_error: None,
        on_response_not_ok_error: None,
        on_response_ok: None,
    };

    /// Replace the assembled `(url, init)` before it is sent.
    pub fn on_before_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(String, RequestInit) -> (String, RequestInit) + Send + Sync + 'static,
    {
        self.on_before_request = Some(Arc::new(hook));
        self
    }

    /// Called when the transport fails.
    pub fn on_fetch_resource_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &RequestInit) -> Flow + Send + Sync + 'static,
    {
        self.on_fetch_resource_error = Some(Arc::new(hook));
        self
    }

    /// Called when the response body is not valid JSON.
    pub fn on_json_transform_error<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(JsonErrorContext<'a>) -> Flow + Send + Sync + 'static,
    {
        self.on_json_transform_error = Some(Arc::new(hook));
        self
    }

    /// Called when the status is outside 2xx. Returning `Continue` lets the
    /// call go on to `on_response_ok` and succeed.
    pub fn on_response_not_ok_error<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(ResponseContext<'a>) -> Flow + Send + Sync + 'static,
    {
        self.on_response_not_ok_error = Some(Arc::new(hook));
        self
    }

    /// Called last on every call that got a parsed body, whatever the status.
    pub fn on_response_ok<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(ResponseContext<'a>) -> Flow + Send + Sync + 'static,
    {
        self.on_response_ok = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_before_request", &self.on_before_request.is_some())
            .field("on_fetch_resource_error", &self.on_fetch_resource_error.is_some())
            .field("on_json_transform_error", &self.on_json_transform_error.is_some())
            .field("on_response_not_ok_error", &self.on_response_not_ok_error.is_some())
            .field("on_response_ok", &self.on_response_ok.is_some())
            .finish()
    }
}
