//! JSON test server for exercising a fetcher over real HTTP.
//!
//! Every route answers deterministically from the request alone, so tests
//! can run in parallel against one server.

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What the server saw, returned by the `/echo` routes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    /// Parsed JSON body, the raw text if it is not JSON, or null when empty.
    pub body: Value,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", any(status))
        .route("/text", get(text))
        .route("/empty", get(empty))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    tracing::debug!(%method, %uri, "echo");
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(Echo {
        method: method.to_string(),
        path: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| uri.path().to_owned()),
        content_type,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, Json<Value>) {
    match StatusCode::from_u16(code) {
        Ok(status) if (200..600).contains(&code) => (status, Json(json!({ "status": code }))),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("unsupported status {code}") })),
        ),
    }
}

async fn text() -> &'static str {
    "plain text, not json"
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}
