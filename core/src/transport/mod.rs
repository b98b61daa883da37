//! Network transports.
//!
//! The fetcher never opens connections itself. It hands the assembled URL and
//! [`RequestInit`] to a [`Transport`] and gets back a [`Response`] with the
//! body already read. Any status code is a successful transport result; only
//! failures to complete the exchange are errors.

use std::future::Future;

use crate::error::TransportError;
use crate::http::{RequestInit, Response};

#[cfg(feature = "ureq-transport")]
mod ureq_transport;
#[cfg(feature = "ureq-transport")]
pub use ureq_transport::UreqTransport;

/// Performs one HTTP exchange.
pub trait Transport: Send + Sync {
    fn perform(
        &self,
        url: &str,
        init: &RequestInit,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn perform(
        &self,
        url: &str,
        init: &RequestInit,
    ) -> impl Future<Output = Result<Response, TransportError>> + Send {
        (**self).perform(url, init)
    }
}
