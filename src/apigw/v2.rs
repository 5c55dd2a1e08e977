//! HTTP API (payload format 2.0) proxy events.
//!
//! Repeated headers arrive comma-joined in one map and are split back into
//! separate values. Cookies travel in their own list in both directions.

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

/// Inbound HTTP API proxy event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub version: String,
    #[serde(default, deserialize_with = "nullable")]
    pub route_key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub raw_path: String,
    #[serde(default, deserialize_with = "nullable")]
    pub raw_query_string: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub headers: HashMap<String, String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "HashMap::is_empty")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "HashMap::is_empty")]
    pub path_parameters: HashMap<String, String>,
    #[serde(default)]
    pub request_context: RequestContext,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "HashMap::is_empty")]
    pub stage_variables: HashMap<String, String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_base64_encoded: bool,
}

/// Account, stage and HTTP details attached by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    pub route_key: String,
    pub account_id: String,
    pub stage: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorizer: Option<Authorizer>,
    /// HTTP API id.
    pub api_id: String,
    pub domain_name: String,
    pub domain_prefix: String,
    pub time: String,
    pub time_epoch: i64,
    pub http: HttpDescription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
}

/// mTLS authentication details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Authentication {
    pub client_cert: ClientCert,
}

/// Client certificate presented over mTLS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientCert {
    #[serde(rename = "clientCertPem")]
    pub client_cert_pem: String,
    #[serde(rename = "issuerDN")]
    pub issuer_dn: String,
    #[serde(rename = "serialNumber")]
    pub serial_number: String,
    #[serde(rename = "subjectDN")]
    pub subject_dn: String,
    pub validity: ClientCertValidity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientCertValidity {
    pub not_after: String,
    pub not_before: String,
}

/// Output of whichever authorizer ran for the route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Authorizer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<JwtAuthorizer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda: Option<HashMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam: Option<IamAuthorizer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtAuthorizer {
    #[serde(deserialize_with = "nullable")]
    pub claims: HashMap<String, String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IamAuthorizer {
    pub access_key: String,
    pub account_id: String,
    pub caller_id: String,
    pub cognito_identity: CognitoIdentity,
    pub principal_org_id: String,
    pub user_arn: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CognitoIdentity {
    pub amr: Vec<String>,
    pub identity_id: String,
    pub identity_pool_id: String,
}

/// Method, path and caller of the HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpDescription {
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub source_ip: String,
    pub user_agent: String,
}

/// Outbound HTTP API proxy response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub cookies: Vec<String>,
}

impl ResponseCapability for HttpResponse {
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

    fn set_cookies(&mut self, cookies: Vec<String>) {
        self.cookies = cookies;
    }
}

impl From<HttpRequest> for RequestConfig<RequestContext> {
    fn from(event: HttpRequest) -> Self {
        let multi_value_headers = event
            .headers
            .into_iter()
            .map(|(name, joined)| {
                let values = joined.split(',').map(|v| v.trim().to_string()).collect();
                (name, values)
            })
            .collect();

        RequestConfig {
            path: event.raw_path,
            query_string: event.raw_query_string,
            body: event.body,
            is_base64: event.is_base64_encoded,
            method: event.request_context.http.method.clone(),
            source_ip: event.request_context.http.source_ip.clone(),
            multi_value_headers,
            cookies: event.cookies,
            request_id: event.request_context.request_id.clone(),
            stage: event.request_context.stage.clone(),
            context: event.request_context,
            ..RequestConfig::default()
        }
    }
}

/// Serve HTTP API proxy events with `service`.
pub fn handler<S>(service: S) -> Handler<HttpRequest, HttpResponse>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    handler_with_limit(service, DEFAULT_MAX_BODY_BYTES)
}

/// Like [`handler`], with an explicit cap on the buffered response body.
pub fn handler_with_limit<S>(service: S, max_body_bytes: usize) -> Handler<HttpRequest, HttpResponse>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    service_handler::<HttpRequest, HttpResponse, RequestContext, S>(service, max_body_bytes)
}
