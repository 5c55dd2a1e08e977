//! Built-in echo service.
//!
//! Answers every method and path with a JSON description of the request it
//! received. Used by the bundled binaries to check a deployment end to end.

use std::collections::BTreeMap;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::engine::Context;
use crate::http::RemoteAddr;

const MAX_ECHO_BODY: usize = 1024 * 1024;

/// What the echo service reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoResponse {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
    pub source_ip: Option<String>,
    pub request_id: Option<String>,
}

/// Router answering every request with an [`EchoResponse`].
pub fn router() -> Router {
    Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo))
        .layer(TraceLayer::new_for_http())
}

async fn echo(request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, MAX_ECHO_BODY).await {
        Ok(body) => body,
        Err(e) => return (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response(),
    };

    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &parts.headers {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    Json(EchoResponse {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
        source_ip: parts.extensions.get::<RemoteAddr>().map(|a| a.0.clone()),
        request_id: parts
            .extensions
            .get::<Context>()
            .map(|ctx| ctx.request_id.clone()),
    })
    .into_response()
}
