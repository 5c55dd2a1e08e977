//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;

/// Which runtime API endpoint received a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    Response,
    Error,
    InitError,
}

/// A post received by the mock runtime API.
#[derive(Debug, Clone)]
pub struct Posted {
    pub kind: PostKind,
    pub request_id: Option<String>,
    pub error_type_header: Option<String>,
    pub body: Value,
}

struct Queued {
    request_id: String,
    body: String,
    trace_id: Option<String>,
}

#[derive(Default)]
struct MockState {
    queue: Mutex<VecDeque<Queued>>,
    posts: Mutex<Vec<Posted>>,
    polls: Mutex<u32>,
}

/// In-process stand-in for the Lambda Runtime API on an ephemeral port.
///
/// `invocation/next` answers 500 once the queue is empty, so a runtime loop
/// under test terminates after its retry budget.
pub struct MockRuntime {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockRuntime {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/2018-06-01/runtime/invocation/next", get(next))
            .route("/2018-06-01/runtime/invocation/{id}/response", post(response))
            .route("/2018-06-01/runtime/invocation/{id}/error", post(error))
            .route("/2018-06-01/runtime/init/error", post(init_error))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Value for `AWS_LAMBDA_RUNTIME_API`.
    pub fn api(&self) -> String {
        self.addr.to_string()
    }

    pub fn push_event(&self, request_id: &str, event: &Value) {
        self.push_raw(request_id, &event.to_string(), None);
    }

    pub fn push_traced_event(&self, request_id: &str, event: &Value, trace_id: &str) {
        self.push_raw(request_id, &event.to_string(), Some(trace_id));
    }

    pub fn push_raw(&self, request_id: &str, body: &str, trace_id: Option<&str>) {
        self.state.queue.lock().unwrap().push_back(Queued {
            request_id: request_id.to_string(),
            body: body.to_string(),
            trace_id: trace_id.map(str::to_string),
        });
    }

    pub fn posts(&self) -> Vec<Posted> {
        self.state.posts.lock().unwrap().clone()
    }

    pub fn polls(&self) -> u32 {
        *self.state.polls.lock().unwrap()
    }
}

async fn next(State(state): State<Arc<MockState>>) -> Response {
    *state.polls.lock().unwrap() += 1;

    let Some(queued) = state.queue.lock().unwrap().pop_front() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "no more invocations").into_response();
    };

    let deadline = SystemTime::now() + Duration::from_secs(30);
    let deadline_ms = deadline.duration_since(UNIX_EPOCH).unwrap().as_millis();

    let mut headers = HeaderMap::new();
    headers.insert(
        "lambda-runtime-aws-request-id",
        HeaderValue::from_str(&queued.request_id).unwrap(),
    );
    headers.insert(
        "lambda-runtime-deadline-ms",
        HeaderValue::from_str(&deadline_ms.to_string()).unwrap(),
    );
    headers.insert(
        "lambda-runtime-invoked-function-arn",
        HeaderValue::from_static("arn:aws:lambda:us-east-1:123456789012:function:test"),
    );
    if let Some(trace_id) = queued.trace_id {
        headers.insert("lambda-runtime-trace-id", HeaderValue::from_str(&trace_id).unwrap());
    }

    (headers, queued.body).into_response()
}

fn record(
    state: &MockState,
    kind: PostKind,
    request_id: Option<String>,
    headers: &HeaderMap,
    body: &Bytes,
) -> StatusCode {
    let body = serde_json::from_slice(body).unwrap_or(Value::Null);
    let error_type_header = headers
        .get("lambda-runtime-function-error-type")
        .map(|v| v.to_str().unwrap().to_string());

    state.posts.lock().unwrap().push(Posted {
        kind,
        request_id,
        error_type_header,
        body,
    });
    StatusCode::ACCEPTED
}

async fn response(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    record(&state, PostKind::Response, Some(id), &headers, &body)
}

async fn error(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    record(&state, PostKind::Error, Some(id), &headers, &body)
}

async fn init_error(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    record(&state, PostKind::InitError, None, &headers, &body)
}

/// Minimal HTTP API event for `method path?query`.
pub fn v2_event(method: &str, path: &str, query: &str) -> Value {
    serde_json::json!({
        "version": "2.0",
        "routeKey": "$default",
        "rawPath": path,
        "rawQueryString": query,
        "headers": {"user-agent": "integration-test"},
        "requestContext": {
            "requestId": "gw-req",
            "stage": "$default",
            "http": {"method": method, "path": path, "sourceIp": "192.0.2.10"}
        },
        "isBase64Encoded": false
    })
}
