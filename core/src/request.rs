//! Request assembly: URL joining and option layering.
//!
//! # Design
//! The final `RequestInit` is built by overlaying, in increasing precedence,
//! the verb's method, the instance `defaults`, the instance `fetch`
//! defaults and the per-call options. Each layer replaces whole fields of
//! the previous ones. The base URL is concatenated as-is: no separator is
//! inserted and nothing is encoded.
//!
//! `on_before_request`, when configured, sees the assembled pair and its
//! return value is what gets sent. Nothing here can fail.

use crate::client::Fetcher;
use crate::http::{Method, RequestInit};
use crate::options::RequestOptions;

impl<T> Fetcher<T> {
    /// Compute the `(url, init)` pair sent for `method` and `options`.
    pub fn build_request(&self, method: Method, options: &RequestOptions) -> (String, RequestInit) {
        let url = match &self.config.base_url {
            Some(base_url) => format!("{base_url}{}", options.url),
            None => options.url.clone(),
        };

        let mut init = RequestInit::new(method);
        init.overlay(&self.config.defaults);
        init.overlay(&self.config.fetch);
        init.overlay(&options.init);
        init.body = options.body.clone();

        match &self.config.hooks.on_before_request {
            Some(hook) => hook(url, init),
            None => (url, init),
        }
    }
}
