//! API Gateway protocol bridges.
//!
//! # Responsibilities
//! - Model the v1 (REST) and v2 (HTTP API) proxy events and responses
//! - Extract a [`RequestConfig`] from each event shape
//! - Adapt a `tower::Service` into an engine [`Handler`] per shape
//!
//! # Data Flow
//! ```text
//! event JSON → ProxyRequest / HttpRequest (serde)
//!     → RequestConfig (From impl)
//!     → http::Request → service → ResponseWriter
//!     → ProxyResponse / HttpResponse (ResponseCapability)
//! ```

pub mod v1;
pub mod v2;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use serde::{Deserialize, Deserializer};
use tower::Service;

use crate::engine::{Context, Handler, HandlerFuture};
use crate::error::BoxError;
use crate::http::{serve, RequestConfig, ResponseCapability, ResponseWriter};

/// Build a handler that translates event `E`, calls `service` and returns `O`.
///
/// On error the writer is dropped unfinished and no response is produced.
fn service_handler<E, O, C, S>(service: S, max_body_bytes: usize) -> Handler<E, O>
where
    E: Into<RequestConfig<C>> + Send + 'static,
    O: ResponseCapability + Default + Send + 'static,
    C: Clone + Send + Sync + 'static,
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    Arc::new(move |ctx: Context, event: E| -> HandlerFuture<O> {
        let service = service.clone();
        Box::pin(async move {
            let config: RequestConfig<C> = event.into();
            let request = config.into_request(&ctx)?;

            let mut writer = ResponseWriter::new(O::default());
            serve(service, request, &mut writer, max_body_bytes).await?;
            Ok(writer.end())
        })
    })
}

/// Deserialize a field that the gateway may send as `null`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
