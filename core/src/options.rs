//! Per-call and default request options.
//!
//! # Design
//! `FetchOptions` is the layerable subset of a request: the instance
//! defaults, the instance fetch defaults and every call carry one, and the
//! assembler overlays them in that order. It has no `method`, `url` or body
//! field, so those can only come from the verb and the call itself.
//!
//! GET and DELETE take `BodyLessOptions`; POST, PUT and PATCH take
//! `BodyFullOptions`, which may carry a JSON `data` payload.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::FetcherError;
use crate::http::Headers;

/// Content type sent with every request.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Fetch-compatible fields that can be layered over one another.
///
/// Unset fields leave the value from an earlier layer in place; set fields
/// replace it entirely (headers are not merged by name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub headers: Option<Headers>,
    /// Passed through to the transport as its request deadline.
    pub timeout: Option<Duration>,
    pub max_redirects: Option<u32>,
}

impl FetchOptions {
    /// Options with no field set.
    pub const EMPTY: Self = Self {
        headers: None,
        timeout: None,
        max_redirects: None,
    };

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = Some(max_redirects);
        self
    }
}

/// Options for verbs that never send a body (GET, DELETE).
#[derive(Debug, Clone, PartialEq)]
pub struct BodyLessOptions {
    pub url: String,
    pub init: FetchOptions,
}

impl BodyLessOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            init: FetchOptions::EMPTY,
        }
    }

    pub fn init(mut self, init: FetchOptions) -> Self {
        self.init = init;
        self
    }
}

/// Options for verbs that may send a JSON body (POST, PUT, PATCH).
#[derive(Debug, Clone, PartialEq)]
pub struct BodyFullOptions {
    pub url: String,
    pub data: Option<Value>,
    pub init: FetchOptions,
}

impl BodyFullOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            data: None,
            init: FetchOptions::EMPTY,
        }
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Encode any serializable value as the payload.
    pub fn serialize_data<T: Serialize + ?Sized>(mut self, data: &T) -> Result<Self, FetcherError> {
        let value = serde_json::to_value(data).map_err(FetcherError::Serialize)?;
        self.data = Some(value);
        Ok(self)
    }

    pub fn init(mut self, init: FetchOptions) -> Self {
        self.init = init;
        self
    }
}

impl From<&str> for BodyLessOptions {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for BodyLessOptions {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl From<&str> for BodyFullOptions {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for BodyFullOptions {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl From<BodyLessOptions> for BodyFullOptions {
    fn from(options: BodyLessOptions) -> Self {
        Self {
            url: options.url,
            data: None,
            init: options.init,
        }
    }
}

/// The per-call layer handed to the assembler once the payload is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub url: String,
    pub init: FetchOptions,
    pub body: Option<String>,
}

impl BodyFullOptions {
    /// Encode `data` into a body and force the JSON content type.
    ///
    /// The header list of the call is always replaced with the single
    /// `Content-Type` entry. The body is only set when `data` is truthy.
    pub fn encode(&self) -> Result<RequestOptions, FetcherError> {
        let body = match self.data.as_ref().filter(|data| is_truthy(data)) {
            Some(data) => Some(serde_json::to_string(data).map_err(FetcherError::Serialize)?),
            None => None,
        };

        let mut init = self.init.clone();
        init.headers = Some(vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())]);

        Ok(RequestOptions {
            url: self.url.clone(),
            init,
            body,
        })
    }
}

/// JavaScript truthiness over JSON values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_json_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&value), "{value} should be falsy");
        }
    }

    #[test]
    fn truthy_json_values() {
        for value in [json!(true), json!(1), json!(-0.5), json!("x"), json!([]), json!({})] {
            assert!(is_truthy(&value), "{value} should be truthy");
        }
    }

    #[test]
    fn encode_sets_body_and_header_for_truthy_data() {
        let opts = BodyFullOptions::new("/items").data(json!({"name": "a"}));
        let encoded = opts.encode().unwrap();
        assert_eq!(encoded.url, "/items");
        let body: Value = serde_json::from_str(encoded.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "a"}));
        assert_eq!(
            encoded.init.headers,
            Some(vec![("Content-Type".to_string(), "application/json".to_string())])
        );
    }

    #[test]
    fn encode_skips_body_for_falsy_data_but_keeps_header() {
        for data in [None, Some(json!(null)), Some(json!(false)), Some(json!(0)), Some(json!(""))] {
            let mut opts = BodyFullOptions::new("/items");
            opts.data = data;
            let encoded = opts.encode().unwrap();
            assert!(encoded.body.is_none());
            assert_eq!(
                encoded.init.headers,
                Some(vec![("Content-Type".to_string(), "application/json".to_string())])
            );
        }
    }

    #[test]
    fn encode_replaces_caller_headers() {
        let opts = BodyFullOptions::new("/items").init(
            FetchOptions::default()
                .header("Authorization", "Bearer t")
                .timeout(Duration::from_secs(2)),
        );
        let encoded = opts.encode().unwrap();
        assert_eq!(
            encoded.init.headers,
            Some(vec![("Content-Type".to_string(), "application/json".to_string())])
        );
        assert_eq!(encoded.init.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn serialize_data_accepts_structs() {
        #[derive(Serialize)]
        struct Payload {
            id: u32,
        }
        let opts = BodyFullOptions::new("/p").serialize_data(&Payload { id: 7 }).unwrap();
        assert_eq!(opts.data, Some(json!({"id": 7})));
    }

    #[test]
    fn serialize_data_reports_unencodable_values() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let err = BodyFullOptions::new("/p").serialize_data(&map).unwrap_err();
        assert!(matches!(err, FetcherError::Serialize(_)));
    }
}
