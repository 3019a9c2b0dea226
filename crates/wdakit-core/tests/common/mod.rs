//! Shared test helpers for wdakit-core integration tests.
//!
//! Provides an in-process mock WDA server: canned JSON replies keyed by HTTP
//! method and path, with every incoming request recorded for assertions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use wdakit_core::transport::HttpTransport;
use wdakit_core::Session;

/// Session id served by every mock.
pub const SESSION_ID: &str = "MOCK-SESSION";

/// One request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Parsed JSON body, or `None` for an empty or non-JSON body.
    pub body: Option<Value>,
}

struct MockState {
    routes: HashMap<(String, String), (u16, String)>,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Builder for a [`MockWda`] server.
#[derive(Default)]
pub struct MockWdaBuilder {
    routes: HashMap<(String, String), (u16, String)>,
    delay: Option<Duration>,
}

impl MockWdaBuilder {
    /// Reply to `method path` (path relative to the session) with a 200 and
    /// `{"value": value, "sessionId": ...}`.
    pub fn value(self, method: &str, path: &str, value: Value) -> Self {
        let body = json!({ "value": value, "sessionId": SESSION_ID });
        self.raw(method, path, 200, &body.to_string())
    }

    /// Reply to `method path` with a W3C error envelope.
    pub fn error(self, method: &str, path: &str, status: u16, error: &str, message: &str) -> Self {
        let body = json!({
            "value": { "error": error, "message": message, "traceback": "" },
            "sessionId": SESSION_ID,
        });
        self.raw(method, path, status, &body.to_string())
    }

    /// Reply to `method path` with an arbitrary status and body text.
    pub fn raw(mut self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            (method.to_uppercase(), session_path(path)),
            (status, body.to_string()),
        );
        self
    }

    /// Hold every reply for `delay` before sending it.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Bind to an ephemeral localhost port and start serving.
    pub async fn start(self) -> MockWda {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            routes: self.routes,
            delay: self.delay,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        MockWda {
            addr,
            state,
            server,
        }
    }
}

/// A running mock WDA server. Stops when dropped.
pub struct MockWda {
    pub addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockWda {
    pub fn builder() -> MockWdaBuilder {
        MockWdaBuilder::default()
    }

    pub fn session_url(&self) -> String {
        format!("http://{}/session/{}", self.addr, SESSION_ID)
    }

    /// A [`Session`] pointed at this mock over real HTTP.
    pub fn session(&self) -> Session {
        direct_session(&self.session_url())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("mock received no requests")
    }
}

impl Drop for MockWda {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A [`Session`] for `url` whose client ignores proxy environment variables.
pub fn direct_session(url: &str) -> Session {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    Session::with_transport(url, Arc::new(HttpTransport::from_client(client))).unwrap()
}

/// Maps a session-relative path (`"/window/size"`, or `""` for the session
/// root) to the absolute path the client requests.
pub fn session_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        format!("/session/{SESSION_ID}")
    } else {
        format!("/session/{SESSION_ID}/{trimmed}")
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    let (status, text) = match state.routes.get(&(method.to_string(), path)) {
        Some((status, text)) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::OK),
            text.clone(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            json!({
                "value": { "error": "unknown command", "message": "Unhandled endpoint" },
                "sessionId": SESSION_ID,
            })
            .to_string(),
        ),
    };

    (status, [(header::CONTENT_TYPE, "application/json")], text)
}
