//! Instance configuration for a [`Fetcher`](crate::Fetcher).

use crate::hooks::Hooks;
use crate::options::FetchOptions;

/// Configuration captured once when a fetcher is created.
///
/// `defaults` and `fetch` are both layered under every call, `defaults`
/// first. A fetcher never mutates its configuration.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Prefix concatenated verbatim in front of every call URL.
    pub base_url: Option<String>,
    pub defaults: FetchOptions,
    pub fetch: FetchOptions,
    pub hooks: Hooks,
}

impl FetcherConfig {
    /// Configuration with nothing set.
    pub const EMPTY: Self = Self {
        base_url: None,
        defaults: FetchOptions::EMPTY,
        fetch: FetchOptions::EMPTY,
        hooks: Hooks::EMPTY,
    };

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn defaults(mut self, defaults: FetchOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::EMPTY
    }
}
