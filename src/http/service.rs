//! Bridge from a `tower::Service` to the response capture surface.
//!
//! Any service answering `Request<Body>` with `Response<Body>` (an
//! `axum::Router`, a `tower::service_fn`, ...) can serve proxy events: its
//! response is replayed into a [`ResponseWriter`] exactly as a writer-style
//! handler would have produced it.

use axum::body::Body;
use axum::http::{Request, Response};
use tower::{Service, ServiceExt};

use crate::error::{BoxError, Error};
use crate::http::response::{ResponseCapability, ResponseWriter};

/// Call `service` once with `request` and write its response into `writer`.
///
/// The response body is buffered up to `max_body_bytes`; a larger or broken
/// body fails with [`Error::ResponseBody`].
pub async fn serve<S, R>(
    service: S,
    request: Request<Body>,
    writer: &mut ResponseWriter<R>,
    max_body_bytes: usize,
) -> Result<(), BoxError>
where
    S: Service<Request<Body>, Response = Response<Body>>,
    S::Error: Into<BoxError>,
    R: ResponseCapability,
{
    let response = service
        .oneshot(request)
        .await
        .map_err(Into::<BoxError>::into)?;
    let (parts, body) = response.into_parts();

    let headers = writer.headers_mut();
    for (name, value) in &parts.headers {
        headers.append(name.clone(), value.clone());
    }
    writer.write_header(parts.status);

    let bytes = axum::body::to_bytes(body, max_body_bytes)
        .await
        .map_err(|e| Error::ResponseBody(e.into()))?;

    if !bytes.is_empty() {
        writer.write_body(&bytes);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;

    #[derive(Debug, Default)]
    struct Out {
        status: u16,
        headers: HashMap<String, String>,
        multi: HashMap<String, Vec<String>>,
        body: String,
        base64: bool,
        cookies: Vec<String>,
    }

    impl ResponseCapability for Out {
        fn set_status_code(&mut self, status: u16) {
            self.status = status;
        }
        fn set_headers(&mut self, headers: HashMap<String, String>) {
            self.headers = headers;
        }
        fn set_multi_value_headers(&mut self, headers: HashMap<String, Vec<String>>) {
            self.multi = headers;
        }
        fn set_body(&mut self, body: String) {
            self.body = body;
        }
        fn set_is_base64_encoded(&mut self, is_base64: bool) {
            self.base64 = is_base64;
        }
        fn set_cookies(&mut self, cookies: Vec<String>) {
            self.cookies = cookies;
        }
    }

    fn app() -> Router {
        Router::new()
            .route("/json", get(|| async {
                ([(header::CONTENT_TYPE, "application/json")], r#"{"ok":true}"#)
            }))
            .route("/png", get(|| async {
                ([(header::CONTENT_TYPE, "image/png")], vec![0u8, 1, 2])
            }))
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT.into_response() }))
    }

    async fn call(path: &str) -> Out {
        let mut writer = ResponseWriter::new(Out::default());
        let request = Request::get(path).body(Body::empty()).unwrap();
        serve(app(), request, &mut writer, 1024).await.unwrap();
        writer.end()
    }

    #[tokio::test]
    async fn test_json_route() {
        let out = call("/json").await;
        assert_eq!(out.status, 200);
        assert_eq!(out.headers["content-type"], "application/json");
        assert_eq!(out.body, r#"{"ok":true}"#);
        assert!(!out.base64);
    }

    #[tokio::test]
    async fn test_binary_route() {
        let out = call("/png").await;
        assert!(out.base64);
        assert_eq!(out.body, "AAEC");
    }

    #[tokio::test]
    async fn test_status_only_route() {
        let out = call("/teapot").await;
        assert_eq!(out.status, 418);
        assert_eq!(out.body, "");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let out = call("/missing").await;
        assert_eq!(out.status, 404);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let app = Router::new().route("/big", get(|| async { "x".repeat(64) }));
        let mut writer = ResponseWriter::new(Out::default());
        let request = Request::get("/big").body(Body::empty()).unwrap();

        let err = serve(app, request, &mut writer, 8).await.unwrap_err();
        assert!(err.to_string().starts_with("response: reading handler body"));
    }
}
