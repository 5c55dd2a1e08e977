//! Lambda Runtime API client.
//!
//! # Responsibilities
//! - Long-poll the next invocation and build its [`Context`]
//! - Post handler responses and handler errors for an invocation
//! - Report initialization failures
//!
//! # Design Decisions
//! - No request timeout: `invocation/next` blocks until the host has work
//! - Any non-2xx answer is an error; the caller decides whether to retry

use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;

use crate::engine::Context;
use crate::error::{BoxError, Error, Result};

const API_VERSION: &str = "2018-06-01";

pub const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
pub const DEADLINE_HEADER: &str = "lambda-runtime-deadline-ms";
pub const FUNCTION_ARN_HEADER: &str = "lambda-runtime-invoked-function-arn";
pub const TRACE_ID_HEADER: &str = "lambda-runtime-trace-id";
pub const FUNCTION_ERROR_TYPE_HEADER: &str = "lambda-runtime-function-error-type";

/// Error type reported for handler failures that are not engine errors.
pub const HANDLER_ERROR_TYPE: &str = "HandlerError";

/// One invocation fetched from the runtime API.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub context: Context,
    /// Raw event JSON.
    pub body: Bytes,
}

/// Error document accepted by the runtime API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_message: String,
    pub error_type: String,
}

impl ErrorReport {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            error_type: error_type.into(),
        }
    }

    /// Report for an engine error, typed by its kind.
    pub fn from_error(err: &Error) -> Self {
        Self::new(err.kind(), err.to_string())
    }

    /// Report for a handler failure. Engine errors keep their kind.
    pub fn from_handler(err: &BoxError) -> Self {
        match err.downcast_ref::<Error>() {
            Some(err) => Self::from_error(err),
            None => Self::new(HANDLER_ERROR_TYPE, err.to_string()),
        }
    }
}

/// HTTP client bound to one runtime API endpoint.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    http: Client,
    base: String,
}

impl RuntimeClient {
    /// `api` is the `host:port` from `AWS_LAMBDA_RUNTIME_API`; a full
    /// `http://` URL is accepted too.
    pub fn new(api: &str) -> Result<Self> {
        let api = api.trim_end_matches('/');
        let base = if api.starts_with("http://") || api.starts_with("https://") {
            format!("{api}/{API_VERSION}/runtime")
        } else {
            format!("http://{api}/{API_VERSION}/runtime")
        };

        let http = Client::builder().build()?;
        Ok(Self { http, base })
    }

    /// Base URL of the runtime endpoints.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Block until the host hands out the next invocation.
    pub async fn next_invocation(&self) -> Result<Invocation> {
        let endpoint = "invocation/next";
        let response = self.http.get(self.url(endpoint)).send().await?;
        if response.status() != StatusCode::OK {
            return Err(Error::RuntimeStatus {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        let headers = response.headers();
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let request_id =
            header(REQUEST_ID_HEADER).ok_or(Error::MissingInvocationHeader(REQUEST_ID_HEADER))?;
        let deadline_ms = header(DEADLINE_HEADER)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_default();

        let mut context = Context::new(request_id).with_deadline_ms(deadline_ms);
        context.invoked_function_arn = header(FUNCTION_ARN_HEADER).unwrap_or_default();
        if let Some(trace_id) = header(TRACE_ID_HEADER) {
            context = context.with_trace_id(trace_id);
        }

        let body = response.bytes().await?;
        Ok(Invocation { context, body })
    }

    /// Post the serialized handler response for `request_id`.
    pub async fn send_response(&self, request_id: &str, body: Vec<u8>) -> Result<()> {
        let endpoint = format!("invocation/{request_id}/response");
        let request = self
            .http
            .post(self.url(&endpoint))
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send(endpoint, request).await
    }

    /// Report a failed invocation.
    pub async fn send_error(&self, request_id: &str, report: &ErrorReport) -> Result<()> {
        let endpoint = format!("invocation/{request_id}/error");
        let request = self
            .http
            .post(self.url(&endpoint))
            .header(FUNCTION_ERROR_TYPE_HEADER, report.error_type.as_str())
            .json(report);
        self.send(endpoint, request).await
    }

    /// Report a failure that happened before the first invocation.
    pub async fn send_init_error(&self, report: &ErrorReport) -> Result<()> {
        let endpoint = "init/error".to_string();
        let request = self
            .http
            .post(self.url(&endpoint))
            .header(FUNCTION_ERROR_TYPE_HEADER, report.error_type.as_str())
            .json(report);
        self.send(endpoint, request).await
    }

    async fn send(&self, endpoint: String, request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::RuntimeStatus {
                endpoint,
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base, endpoint)
    }
}
