//! REST API (payload format 1.0) proxy events.
//!
//! Single- and multi-valued headers and query parameters arrive as separate
//! maps. Cookies have no field of their own in this format.
//!
//! # Design Decisions
//! - The gateway fills both header maps for the same keys. A single-valued
//!   header is dropped when the multi-valued map has its key (compared
//!   case-insensitively), so handlers see each value once. Merging both maps
//!   as-is would repeat the first value of every such header.
//! - `path` arrives percent-decoded; it is re-escaped when the request is
//!   built, so spaces and other raw characters reach the service intact.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{Request, Response};
use serde::{Deserialize, Serialize};
use tower::Service;

use crate::apigw::{is_false, nullable, service_handler};
use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::engine::Handler;
use crate::error::BoxError;
use crate::http::{RequestConfig, ResponseCapability};

/// Inbound REST API proxy event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// Resource path template configured in the gateway.
    #[serde(default, deserialize_with = "nullable")]
    pub resource: String,
    /// Path requested by the caller.
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
    #[serde(default, deserialize_with = "nullable")]
    pub http_method: String,
    #[serde(default, deserialize_with = "nullable")]
    pub headers: HashMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    pub multi_value_query_string_parameters: HashMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub path_parameters: HashMap<String, String>,
    #[serde(default, deserialize_with = "nullable")]
    pub stage_variables: HashMap<String, String>,
    #[serde(default)]
    pub request_context: RequestContext,
    #[serde(default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_base64_encoded: bool,
}

/// Account, stage and caller information attached by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default, deserialize_with = "nullable")]
    pub account_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub stage: String,
    #[serde(default, deserialize_with = "nullable")]
    pub domain_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub domain_prefix: String,
    #[serde(default, deserialize_with = "nullable")]
    pub request_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub extended_request_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub protocol: String,
    #[serde(default)]
    pub identity: RequestIdentity,
    #[serde(default, deserialize_with = "nullable")]
    pub resource_path: String,
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
    #[serde(default, deserialize_with = "nullable")]
    pub authorizer: HashMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub http_method: String,
    #[serde(default, deserialize_with = "nullable")]
    pub request_time: String,
    #[serde(default, deserialize_with = "nullable")]
    pub request_time_epoch: i64,
    /// REST API id.
    #[serde(default, deserialize_with = "nullable")]
    pub api_id: String,
}

/// Caller identity. Most fields are `null` unless IAM or Cognito auth is on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestIdentity {
    pub cognito_identity_pool_id: Option<String>,
    pub account_id: Option<String>,
    pub cognito_identity_id: Option<String>,
    pub caller: Option<String>,
    pub api_key: Option<String>,
    pub api_key_id: Option<String>,
    pub access_key: Option<String>,
    pub source_ip: Option<String>,
    pub cognito_authentication_type: Option<String>,
    pub cognito_authentication_provider: Option<String>,
    pub user_arn: Option<String>,
    pub user_agent: Option<String>,
    pub user: Option<String>,
}

/// Outbound REST API proxy response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_base64_encoded: bool,
}

impl ResponseCapability for ProxyResponse {
    fn set_status_code(&mut self, status: u16) {
        self.status_code = status;
    }

    fn set_headers(&mut self, headers: HashMap<String, String>) {
        self.headers = headers;
    }

    fn set_multi_value_headers(&mut self, headers: HashMap<String, Vec<String>>) {
        self.multi_value_headers = headers;
    }

    fn set_body(&mut self, body: String) {
        self.body = body;
    }

    fn set_is_base64_encoded(&mut self, is_base64: bool) {
        self.is_base64_encoded = is_base64;
    }

    fn set_cookies(&mut self, _cookies: Vec<String>) {
        // no cookie field in payload format 1.0
    }
}

impl From<ProxyRequest> for RequestConfig<RequestContext> {
    fn from(event: ProxyRequest) -> Self {
        let mut headers = event.headers;
        headers.retain(|name, _| {
            !event
                .multi_value_headers
                .keys()
                .any(|multi| multi.eq_ignore_ascii_case(name))
        });

        RequestConfig {
            path: event.path,
            // the path's own query is the base the parameter maps overlay
            query_string: String::new(),
            query_parameters: event.query_string_parameters,
            multi_value_query_parameters: event.multi_value_query_string_parameters,
            body: event.body,
            is_base64: event.is_base64_encoded,
            method: event.http_method,
            source_ip: event
                .request_context
                .identity
                .source_ip
                .clone()
                .unwrap_or_default(),
            headers,
            multi_value_headers: event.multi_value_headers,
            cookies: Vec::new(),
            request_id: event.request_context.request_id.clone(),
            stage: event.request_context.stage.clone(),
            context: event.request_context,
        }
    }
}

/// Serve REST API proxy events with `service`.
pub fn handler<S>(service: S) -> Handler<ProxyRequest, ProxyResponse>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    handler_with_limit(service, DEFAULT_MAX_BODY_BYTES)
}

/// Like [`handler`], with an explicit cap on the buffered response body.
pub fn handler_with_limit<S>(service: S, max_body_bytes: usize) -> Handler<ProxyRequest, ProxyResponse>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    service_handler::<ProxyRequest, ProxyResponse, RequestContext, S>(service, max_body_bytes)
}
