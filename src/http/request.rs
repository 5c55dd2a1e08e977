//! Request translation.
//!
//! # Responsibilities
//! - Turn a protocol-neutral [`RequestConfig`] into an `http::Request`
//! - Resolve the query string and decode base64 bodies
//! - Reconcile single-valued headers, multi-valued headers and cookies
//! - Inject request id, stage and trace headers
//!
//! # Design Decisions
//! - Any failure aborts before a request exists; handlers never see a
//!   partial request
//! - Single-valued headers overwrite, multi-valued headers append, cookies
//!   append; query parameters instead resolve "last source wins per key"
//! - The opaque protocol context travels as a typed extension, so unrelated
//!   extensions can never collide with it

use std::collections::HashMap;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::{CONTENT_LENGTH, COOKIE, HOST};
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{HeaderName, HeaderValue, Method, Request, Uri};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use url::{Position, Url};

use crate::engine::Context;
use crate::error::{Error, Result};
use crate::http::query::resolve_query;

/// Request id header injected on every translated request.
pub const X_REQUEST_ID: &str = "x-request-id";
/// Deployment stage header injected on every translated request.
pub const X_STAGE: &str = "x-stage";
/// Trace propagation header, set when the invocation carries a trace id.
pub const X_AMZN_TRACE_ID: &str = "x-amzn-trace-id";

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Protocol-neutral description of an inbound proxy event.
///
/// `C` is the protocol's own request context, handed to the handler
/// untouched as a [`ProxyContext<C>`] extension.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig<C> {
    pub path: String,
    pub query_string: String,
    pub query_parameters: HashMap<String, String>,
    pub multi_value_query_parameters: HashMap<String, Vec<String>>,
    pub body: String,
    pub is_base64: bool,
    pub method: String,
    pub context: C,
    pub source_ip: String,
    pub headers: HashMap<String, String>,
    pub multi_value_headers: HashMap<String, Vec<String>>,
    pub cookies: Vec<String>,
    pub request_id: String,
    pub stage: String,
}

/// Request extension carrying the protocol's request context.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyContext<C>(pub C);

/// Request extension carrying the caller's source IP as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// Request extension carrying the server-side request target
/// (origin-form path and query), independent of any host rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget(pub PathAndQuery);

impl<C> RequestConfig<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Consume the config and build the canonical request.
    pub fn into_request(self, ctx: &Context) -> Result<Request<Body>> {
        let (path, path_query) = split_target(&self.path);

        let raw_query = if self.query_string.is_empty() {
            path_query
        } else {
            self.query_string.as_str()
        };
        let query = resolve_query(
            raw_query,
            &self.query_parameters,
            &self.multi_value_query_parameters,
        );

        let body = if self.is_base64 {
            STANDARD.decode(self.body.as_bytes())?
        } else {
            self.body.into_bytes()
        };
        let body_len = body.len();

        let target = escape_target(path, &query)?;
        let target: PathAndQuery = target.parse().map_err(construction("request target"))?;

        let method = if self.method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(self.method.as_bytes()).map_err(construction("method"))?
        };

        let mut req = Request::builder()
            .method(method)
            .uri(Uri::from(target.clone()))
            .body(Body::from(body))
            .map_err(construction("request"))?;

        req.extensions_mut().insert(RequestTarget(target));

        // remote addr
        if let Ok(ip) = self.source_ip.parse::<IpAddr>() {
            req.extensions_mut().insert(ConnectInfo(SocketAddr::new(ip, 0)));
        }
        req.extensions_mut().insert(RemoteAddr(self.source_ip));

        let headers = req.headers_mut();

        for (name, value) in &self.headers {
            headers.insert(header_name(name)?, header_value(value)?);
        }

        for (name, values) in &self.multi_value_headers {
            let name = header_name(name)?;
            for value in values {
                headers.append(name.clone(), header_value(value)?);
            }
        }

        for cookie in &self.cookies {
            headers.append(COOKIE, header_value(cookie)?);
        }

        if !headers.contains_key(CONTENT_LENGTH) && body_len > 0 {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body_len));
        }

        headers.insert(X_REQUEST_ID, header_value(&self.request_id)?);
        headers.insert(X_STAGE, header_value(&self.stage)?);

        if let Some(trace_id) = &ctx.trace_id {
            headers.insert(X_AMZN_TRACE_ID, header_value(trace_id)?);
        }

        req.extensions_mut().insert(ProxyContext(self.context));
        req.extensions_mut().insert(ctx.clone());

        resolve_host(&mut req);

        Ok(req)
    }
}

/// Split a proxy path into path and query, dropping any fragment.
fn split_target(raw: &str) -> (&str, &str) {
    let raw = raw.split_once('#').map_or(raw, |(before, _)| before);
    raw.split_once('?').unwrap_or((raw, ""))
}

/// Percent-encode a decoded path and a query into an origin-form target.
///
/// Proxies deliver the path decoded (`/my report.pdf`); characters not
/// allowed in a URI are escaped, existing `%XX` escapes are kept.
fn escape_target(path: &str, query: &str) -> Result<String> {
    check_escapes(path)?;

    let mut url = Url::parse("http://localhost/").map_err(|e| Error::PathParse(e.to_string()))?;
    url.set_path(path);
    if !query.is_empty() {
        url.set_query(Some(query));
    }

    Ok(url[Position::BeforePath..].to_string())
}

fn check_escapes(path: &str) -> Result<()> {
    let bytes = path.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'%' {
            continue;
        }
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let end = (i + 3).min(path.len());
            let escape = path.get(i..end).unwrap_or("%");
            return Err(Error::PathParse(format!("invalid escape {escape:?}")));
        }
    }
    Ok(())
}

/// Point the request URI at the authority named by its own `Host` header.
///
/// Proxies deliver the host only as a header; handlers that route on
/// `uri().host()` need it in the URI as well.
fn resolve_host(req: &mut Request<Body>) {
    let Some(host) = req.headers().get(HOST).and_then(|h| h.to_str().ok()) else {
        return;
    };

    let authority = match host.parse::<Authority>() {
        Ok(authority) => authority,
        Err(e) => {
            tracing::debug!(host = %host, error = %e, "Ignoring unparseable Host header");
            return;
        }
    };

    let scheme = req
        .headers()
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Scheme>().ok())
        .unwrap_or(Scheme::HTTPS);

    let mut parts = req.uri().clone().into_parts();
    parts.scheme = Some(scheme);
    parts.authority = Some(authority);

    match Uri::from_parts(parts) {
        Ok(uri) => *req.uri_mut() = uri,
        Err(e) => tracing::debug!(error = %e, "Keeping origin-form request URI"),
    }
}

fn construction<E: Display>(what: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::RequestConstruction(format!("invalid {what}: {e}"))
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(construction("header name"))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(construction("header value"))
}
