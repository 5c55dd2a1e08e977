//! Panic containment for handlers.
//!
//! # Responsibilities
//! - Catch a panic raised while building the handler's future
//! - Catch a panic raised while polling it
//! - Turn either into `Error::PanicRecovered` carrying the payload text
//!
//! # Design Decisions
//! - The decorator adds no output of its own on the success path
//! - With no custom hook the panic is logged through `tracing` at error level

use std::any::Any;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::FutureExt;

use crate::engine::{Context, Decorator, Handler, HandlerFuture};
use crate::error::Error;

/// Hook called with the invocation's context, input and the recovered error.
pub type PanicLogFn<T> = Arc<dyn Fn(&Context, &T, &Error) + Send + Sync>;

/// Configuration for [`PanicRecover`].
pub struct PanicRecoverConfig<T> {
    /// Custom reporting hook. `None` logs via `tracing`.
    pub log_fn: Option<PanicLogFn<T>>,
}

impl<T> Default for PanicRecoverConfig<T> {
    fn default() -> Self {
        Self { log_fn: None }
    }
}

impl<T> Clone for PanicRecoverConfig<T> {
    fn clone(&self) -> Self {
        Self {
            log_fn: self.log_fn.clone(),
        }
    }
}

/// Decorator converting handler panics into errors.
pub struct PanicRecover<T, R> {
    config: PanicRecoverConfig<T>,
    _response: PhantomData<fn() -> R>,
}

impl<T, R> PanicRecover<T, R> {
    pub fn new() -> Self {
        Self::with_config(PanicRecoverConfig::default())
    }

    pub fn with_config(config: PanicRecoverConfig<T>) -> Self {
        Self {
            config,
            _response: PhantomData,
        }
    }
}

impl<T, R> Default for PanicRecover<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> Decorator<T, R> for PanicRecover<T, R>
where
    T: Clone + Debug + Send + Sync + 'static,
    R: Send + 'static,
{
    fn wrap(&self, next: Handler<T, R>) -> Handler<T, R> {
        let log_fn = self.config.log_fn.clone();

        Arc::new(move |ctx: Context, input: T| -> HandlerFuture<R> {
            let next = next.clone();
            let log_fn = log_fn.clone();
            Box::pin(async move {
                let snapshot = (ctx.clone(), input.clone());

                let outcome = match panic::catch_unwind(AssertUnwindSafe(|| next(ctx, input))) {
                    Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
                    Err(payload) => Err(payload),
                };

                let payload = match outcome {
                    Ok(result) => return result,
                    Err(payload) => payload,
                };

                let err = Error::PanicRecovered(panic_message(payload.as_ref()));
                let (ctx, input) = snapshot;
                match &log_fn {
                    Some(log_fn) => log_fn(&ctx, &input, &err),
                    None => tracing::error!(
                        request_id = %ctx.request_id,
                        error = %err,
                        event = ?input,
                        "Handler panicked"
                    ),
                }

                Err(err.into())
            })
        })
    }
}

/// Text of a panic payload: `&str` or `String`, otherwise a placeholder.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
