//! Fetcher instance and the per-call dispatch pipeline.
//!
//! # Design
//! `Fetcher` holds the frozen configuration and a transport; it carries no
//! mutable state between calls. A verb method only records intent in a
//! `PreparedRequest`. Calling `json` on it runs one full cycle:
//!
//! 1. encode the payload and force the JSON content type,
//! 2. assemble `(url, init)`,
//! 3. perform the exchange (`on_fetch_resource_error` on failure),
//! 4. parse the body as JSON (`on_json_transform_error` on failure),
//! 5. run `on_response_not_ok_error` for a non-2xx status,
//! 6. run `on_response_ok`,
//! 7. decode the JSON into the requested type.
//!
//! A hook that returns `Flow::Abort` ends the call at that point with its own
//! error. A non-2xx status alone never fails the call.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::FetcherConfig;
use crate::error::FetcherError;
use crate::hooks::{Flow, JsonErrorContext, ResponseContext};
use crate::http::{Method, Response};
use crate::options::{BodyFullOptions, BodyLessOptions};
use crate::transport::Transport;

/// A configured HTTP client exposing the five JSON verbs.
#[derive(Debug)]
pub struct Fetcher<T> {
    pub(crate) config: FetcherConfig,
    pub(crate) transport: T,
}

/// Successful outcome of a call.
#[derive(Debug, Clone)]
pub struct FetchResult<D> {
    pub response: Response,
    pub data: D,
}

impl<T> Fetcher<T> {
    pub fn new(config: FetcherConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn get(&self, options: impl Into<BodyLessOptions>) -> PreparedRequest<'_, T> {
        let options: BodyLessOptions = options.into();
        self.prepare(Method::Get, options.into())
    }

    pub fn post(&self, options: impl Into<BodyFullOptions>) -> PreparedRequest<'_, T> {
        self.prepare(Method::Post, options.into())
    }

    pub fn put(&self, options: impl Into<BodyFullOptions>) -> PreparedRequest<'_, T> {
        self.prepare(Method::Put, options.into())
    }

    pub fn patch(&self, options: impl Into<BodyFullOptions>) -> PreparedRequest<'_, T> {
        self.prepare(Method::Patch, options.into())
    }

    pub fn delete(&self, options: impl Into<BodyLessOptions>) -> PreparedRequest<'_, T> {
        let options: BodyLessOptions = options.into();
        self.prepare(Method::Delete, options.into())
    }

    fn prepare(&self, method: Method, options: BodyFullOptions) -> PreparedRequest<'_, T> {
        PreparedRequest {
            fetcher: self,
            method,
            options,
        }
    }
}

/// Create a fetcher backed by the default ureq transport.
#[cfg(feature = "ureq-transport")]
pub fn create_fetcher(config: FetcherConfig) -> Fetcher<crate::transport::UreqTransport> {
    Fetcher::new(config, crate::transport::UreqTransport::new())
}

/// A call that has been described but not sent.
///
/// Nothing touches the network until [`json`](Self::json) is awaited. The
/// same prepared request can be executed more than once.
#[derive(Debug)]
pub struct PreparedRequest<'f, T> {
    fetcher: &'f Fetcher<T>,
    method: Method,
    options: BodyFullOptions,
}

impl<T: Transport> PreparedRequest<'_, T> {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn options(&self) -> &BodyFullOptions {
        &self.options
    }

    /// Send the request and decode the JSON response body as `D`.
    #[instrument(skip_all, fields(method = %self.method, url = %self.options.url))]
    pub async fn json<D: DeserializeOwned>(&self) -> Result<FetchResult<D>, FetcherError> {
        let hooks = &self.fetcher.config.hooks;

        let options = self.options.encode()?;
        let (url, init) = self.fetcher.build_request(self.method, &options);

        debug!(%url, method = %init.method, has_body = init.body.is_some(), "sending request");
        let response = match self.fetcher.transport.perform(&url, &init).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%url, error = %err, "transport failed");
                if let Some(hook) = &hooks.on_fetch_resource_error {
                    proceed(hook(&url, &init))?;
                }
                return Err(FetcherError::Resource(err));
            }
        };
        debug!(status = response.status, "response received");

        let data: Value = match response.json() {
            Ok(data) => data,
            Err(err) => {
                warn!(status = response.status, error = %err, "response body is not JSON");
                if let Some(hook) = &hooks.on_json_transform_error {
                    proceed(hook(JsonErrorContext {
                        response: &response,
                    }))?;
                }
                return Err(FetcherError::JsonTransform(err));
            }
        };

        let context = ResponseContext {
            response: &response,
            data: &data,
        };
        if !response.ok() {
            debug!(status = response.status, "non-2xx status");
            if let Some(hook) = &hooks.on_response_not_ok_error {
                proceed(hook(context))?;
            }
        }
        if let Some(hook) = &hooks.on_response_ok {
            proceed(hook(context))?;
        }

        let data = serde_json::from_value(data).map_err(FetcherError::Decode)?;
        Ok(FetchResult { response, data })
    }
}

fn proceed(flow: Flow) -> Result<(), FetcherError> {
    match flow {
        Flow::Continue => Ok(()),
        Flow::Abort(err) => {
            debug!(error = %err, "hook aborted call");
            Err(FetcherError::Hook(err))
        }
    }
}
