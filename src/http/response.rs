//! Response capture.
//!
//! # Responsibilities
//! - Buffer a handler's status, headers and body for one invocation
//! - Finalize headers exactly once (first status wins)
//! - Choose base64 or raw body encoding on `end`
//! - Move `Set-Cookie` values out of the header set into the cookie list
//!
//! # Design Decisions
//! - The proxy response type is reached only through [`ResponseCapability`]
//! - `end` consumes the writer; its state cannot leak into another invocation
//! - Header names are emitted in their canonical lowercase form

use std::collections::HashMap;
use std::io;

use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::sync::oneshot;

use crate::http::binary::is_binary;

/// `Content-Type` applied when the handler sets none.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf8";

/// Operations a protocol response object must support to be filled in by a
/// [`ResponseWriter`].
pub trait ResponseCapability {
    fn set_status_code(&mut self, status: u16);
    fn set_headers(&mut self, headers: HashMap<String, String>);
    fn set_multi_value_headers(&mut self, headers: HashMap<String, Vec<String>>);
    fn set_body(&mut self, body: String);
    fn set_is_base64_encoded(&mut self, is_base64: bool);
    fn set_cookies(&mut self, cookies: Vec<String>);
}

/// Captures a handler's output and finalizes it into `R`.
#[derive(Debug)]
pub struct ResponseWriter<R> {
    out: R,
    buf: Vec<u8>,
    headers: Option<HeaderMap>,
    wrote_header: bool,
    done_tx: Option<oneshot::Sender<()>>,
    done_rx: Option<oneshot::Receiver<()>>,
}

impl<R: ResponseCapability> ResponseWriter<R> {
    pub fn new(out: R) -> Self {
        let (done_tx, done_rx) = oneshot::channel();
        Self {
            out,
            buf: Vec::new(),
            headers: None,
            wrote_header: false,
            done_tx: Some(done_tx),
            done_rx: Some(done_rx),
        }
    }

    /// Pending response headers, created on first access.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.headers.get_or_insert_with(HeaderMap::new)
    }

    /// Whether headers have been finalized.
    pub fn wrote_header(&self) -> bool {
        self.wrote_header
    }

    /// Bytes buffered so far.
    pub fn body(&self) -> &[u8] {
        &self.buf
    }

    /// Finalize the status line and headers. Later calls are ignored.
    pub fn write_header(&mut self, status: StatusCode) {
        if self.wrote_header {
            return;
        }

        let headers = self.headers.get_or_insert_with(HeaderMap::new);
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        }

        self.out.set_status_code(status.as_u16());

        let (single, multi) = partition(headers);
        self.out.set_headers(single);
        self.out.set_multi_value_headers(multi);

        self.wrote_header = true;
    }

    /// Append to the body, finalizing headers with `200 OK` if needed.
    pub fn write_body(&mut self, bytes: &[u8]) -> usize {
        if !self.wrote_header {
            self.write_header(StatusCode::OK);
        }
        self.buf.extend_from_slice(bytes);
        bytes.len()
    }

    /// Receiver fired once `end` has finalized the response.
    ///
    /// Only a finalized response fires it. A writer dropped without `end`
    /// (the service failed, or the body was over the limit) closes the
    /// channel instead, so the receiver resolves to an error.
    ///
    /// Only the first call returns `Some`.
    pub fn completion(&mut self) -> Option<oneshot::Receiver<()>> {
        self.done_rx.take()
    }

    /// Finalize the body and cookies and return the protocol response.
    pub fn end(mut self) -> R {
        if !self.wrote_header {
            self.write_header(StatusCode::OK);
        }

        let mut headers = self.headers.take().unwrap_or_default();

        let binary = is_binary(&headers);
        self.out.set_is_base64_encoded(binary);

        let body = std::mem::take(&mut self.buf);
        if binary {
            self.out.set_body(STANDARD.encode(&body));
        } else {
            let body = String::from_utf8(body)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
            self.out.set_body(body);
        }

        let cookies = headers.get_all(SET_COOKIE).iter().map(lossy).collect();
        headers.remove(SET_COOKIE);
        self.out.set_cookies(cookies);

        if let Some(done) = self.done_tx.take() {
            // The receiver may already be gone; nobody is waiting then.
            let _ = done.send(());
        }

        self.out
    }
}

impl<R: ResponseCapability> io::Write for ResponseWriter<R> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_body(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Split headers into keys with exactly one value and keys with several.
///
/// `Set-Cookie` is left out: proxies carry cookies out-of-band.
fn partition(headers: &HeaderMap) -> (HashMap<String, String>, HashMap<String, Vec<String>>) {
    let mut single = HashMap::new();
    let mut multi = HashMap::new();

    for name in headers.keys() {
        if *name == SET_COOKIE {
            continue;
        }

        let mut values: Vec<String> = headers.get_all(name).iter().map(lossy).collect();
        match values.len() {
            0 => {}
            1 => {
                single.insert(name.as_str().to_string(), values.remove(0));
            }
            _ => {
                multi.insert(name.as_str().to_string(), values);
            }
        }
    }

    (single, multi)
}

fn lossy(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}
