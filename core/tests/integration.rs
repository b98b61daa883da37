//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every verb and hook
//! path through `create_fetcher` and the ureq transport over real HTTP.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fetcher_core::{
    create_fetcher, BodyFullOptions, BodyLessOptions, ErrorKind, FetchOptions, Fetcher,
    FetcherConfig, Flow, Hooks, TransportError, UreqTransport,
};
use mock_server::Echo;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Start the mock server on its own thread and return its address.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// An address nothing listens on.
fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Serve a single connection: read the request head, write `reply` verbatim,
/// keep the socket open for `linger`, then close it.
fn raw_server(reply: &'static [u8], linger: Duration) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request_head(&mut stream);
        stream.write_all(reply).unwrap();
        std::thread::sleep(linger);
    });

    addr
}

fn read_request_head(stream: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
}

fn config_for(addr: SocketAddr) -> FetcherConfig {
    FetcherConfig::default().base_url(format!("http://{addr}"))
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Note {
    title: String,
    pinned: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("rejected with status {0}")]
struct StatusRejected(u16);

#[tokio::test]
async fn verbs_round_trip_through_echo() {
    let fetcher = create_fetcher(config_for(start_server()));

    let get = fetcher.get("/echo/notes?page=1").json::<Echo>().await.unwrap();
    assert!(get.response.ok());
    assert_eq!(get.data.method, "GET");
    assert_eq!(get.data.path, "/echo/notes?page=1");
    assert_eq!(get.data.content_type.as_deref(), Some("application/json"));
    assert!(get.data.body.is_null());

    let note = Note {
        title: "groceries".to_string(),
        pinned: true,
    };
    let post = fetcher
        .post(BodyFullOptions::new("/echo/notes").serialize_data(&note).unwrap())
        .json::<Echo>()
        .await
        .unwrap();
    assert_eq!(post.data.method, "POST");
    let sent: Note = serde_json::from_value(post.data.body).unwrap();
    assert_eq!(sent, note);

    let put = fetcher
        .put(BodyFullOptions::new("/echo/notes/1").data(json!({"title": "x", "pinned": false})))
        .json::<Echo>()
        .await
        .unwrap();
    assert_eq!(put.data.method, "PUT");
    assert_eq!(put.data.body["title"], "x");

    let patch = fetcher
        .patch(BodyFullOptions::new("/echo/notes/1").data(json!({"pinned": true})))
        .json::<Echo>()
        .await
        .unwrap();
    assert_eq!(patch.data.method, "PATCH");
    assert_eq!(patch.data.body, json!({"pinned": true}));

    let delete = fetcher.delete("/echo/notes/1").json::<Echo>().await.unwrap();
    assert_eq!(delete.data.method, "DELETE");
    assert!(delete.data.body.is_null());
}

#[tokio::test]
async fn falsy_payload_is_not_sent() {
    let fetcher = create_fetcher(config_for(start_server()));

    let result = fetcher
        .post(BodyFullOptions::new("/echo").data(json!(false)))
        .json::<Echo>()
        .await
        .unwrap();
    assert!(result.data.body.is_null());
    assert_eq!(result.data.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn non_2xx_resolves_without_hooks() {
    let fetcher = create_fetcher(config_for(start_server()));

    let result = fetcher.get("/status/404").json::<Value>().await.unwrap();
    assert!(!result.response.ok());
    assert_eq!(result.response.status, 404);
    assert_eq!(result.data, json!({"status": 404}));
}

#[tokio::test]
async fn not_ok_hook_can_turn_status_into_error() {
    let hooks = Hooks::default().on_response_not_ok_error(|ctx| {
        Flow::abort(StatusRejected(ctx.response.status))
    });
    let fetcher = create_fetcher(config_for(start_server()).hooks(hooks));

    let err = fetcher
        .put(BodyFullOptions::new("/status/503").data(json!({"a": 1})))
        .json::<Value>()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HookError);
    let inner = err.hook_error().unwrap();
    assert_eq!(inner.downcast_ref::<StatusRejected>().unwrap().0, 503);

    // 2xx responses do not reach the hook.
    fetcher.get("/status/200").json::<Value>().await.unwrap();
}

#[tokio::test]
async fn plain_text_body_is_a_json_error() {
    let fetcher = create_fetcher(config_for(start_server()));

    let err = fetcher.get("/text").json::<Value>().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::JsonTransformError);
    assert_eq!(err.to_string(), "[Fetcher]: Response is not valid JSON");

    let err = fetcher.get("/empty").json::<Value>().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::JsonTransformError);
}

#[tokio::test]
async fn unreachable_server_is_a_resource_error() {
    let fetcher = create_fetcher(config_for(closed_addr()));

    let err = fetcher.get("/echo").json::<Value>().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceError);
    assert_eq!(err.to_string(), "[Fetcher]: Network request failed");
}

#[tokio::test]
async fn resource_error_hook_replaces_error() {
    let hooks = Hooks::default().on_fetch_resource_error(|url, _| {
        Flow::abort(format!("offline while calling {url}"))
    });
    let addr = closed_addr();
    let fetcher = create_fetcher(config_for(addr).hooks(hooks));

    let err = fetcher.delete("/echo/1").json::<Value>().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HookError);
    assert_eq!(err.to_string(), format!("offline while calling http://{addr}/echo/1"));
}

#[tokio::test]
async fn before_request_hook_rewrites_the_call() {
    let addr = start_server();
    let hooks = Hooks::default().on_before_request(move |url, mut init| {
        init.headers.push(("Authorization".to_string(), "Bearer secret".to_string()));
        (url.replace("/missing", "/echo"), init)
    });
    let fetcher = create_fetcher(config_for(addr).hooks(hooks));

    let result = fetcher
        .get(BodyLessOptions::new("/missing/x").init(FetchOptions::default().max_redirects(0)))
        .json::<Echo>()
        .await
        .unwrap();
    assert_eq!(result.data.path, "/echo/x");
}

#[tokio::test]
async fn ok_hook_runs_for_every_parsed_response() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let hook_seen = seen.clone();
    let hooks = Hooks::default().on_response_ok(move |ctx| {
        hook_seen.lock().unwrap().push(ctx.response.status);
        Flow::Continue
    });
    let fetcher = create_fetcher(config_for(start_server()).hooks(hooks));

    fetcher.get("/status/201").json::<Value>().await.unwrap();
    fetcher.get("/status/418").json::<Value>().await.unwrap();
    let _ = fetcher.get("/text").json::<Value>().await;

    assert_eq!(*seen.lock().unwrap(), vec![201, 418]);
}

#[tokio::test]
async fn server_and_fetcher_share_a_current_thread_runtime() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));

    let fetcher = create_fetcher(config_for(addr));
    let get_a = fetcher.get("/echo/a");
    let delete_b = fetcher.delete("/echo/b");
    let calls = async {
        tokio::join!(get_a.json::<Echo>(), delete_b.json::<Echo>(),)
    };
    let (a, b) = tokio::time::timeout(Duration::from_secs(5), calls)
        .await
        .expect("calls did not complete");

    assert_eq!(a.unwrap().data.path, "/echo/a");
    assert_eq!(b.unwrap().data.method, "DELETE");
}

#[tokio::test]
async fn truncated_body_is_a_json_error() {
    let addr = raw_server(
        concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: application/json\r\n",
            "Content-Length: 100\r\n\r\n",
            "{\"a\"",
        )
        .as_bytes(),
        Duration::ZERO,
    );
    let log = Arc::new(Mutex::new(Vec::new()));
    let json_log = log.clone();
    let resource_log = log.clone();
    let hooks = Hooks::default()
        .on_json_transform_error(move |ctx| {
            json_log.lock().unwrap().push(ctx.response.status);
            Flow::Continue
        })
        .on_fetch_resource_error(move |_, _| {
            resource_log.lock().unwrap().push(0);
            Flow::Continue
        });
    let fetcher = create_fetcher(config_for(addr).hooks(hooks));

    let err = fetcher.get("/x").json::<Value>().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::JsonTransformError);
    assert_eq!(err.to_string(), "[Fetcher]: Response is not valid JSON");
    assert_eq!(*log.lock().unwrap(), vec![200]);
}

#[tokio::test]
async fn silent_server_times_out() {
    let addr = raw_server(b"", Duration::from_secs(5));
    let transport = UreqTransport::with_timeout(Some(Duration::from_millis(300)));
    let fetcher = Fetcher::new(config_for(addr), transport);

    let err = fetcher.get("/slow").json::<Value>().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceError);
    let source = std::error::Error::source(&err).unwrap();
    assert!(matches!(
        source.downcast_ref::<TransportError>(),
        Some(TransportError::Timeout)
    ));
}
