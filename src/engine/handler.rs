//! Handler and decorator types.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::engine::Context;
use crate::error::BoxError;

/// Future returned by a [`Handler`].
pub type HandlerFuture<R> = BoxFuture<'static, Result<R, BoxError>>;

/// A type-erased function from `(Context, T)` to `Result<R, BoxError>`.
pub type Handler<T, R> = Arc<dyn Fn(Context, T) -> HandlerFuture<R> + Send + Sync>;

/// Wraps a handler to add behaviour without changing its signature.
pub trait Decorator<T, R>: Send + Sync {
    fn wrap(&self, next: Handler<T, R>) -> Handler<T, R>;
}

impl<T, R, F> Decorator<T, R> for F
where
    F: Fn(Handler<T, R>) -> Handler<T, R> + Send + Sync,
{
    fn wrap(&self, next: Handler<T, R>) -> Handler<T, R> {
        self(next)
    }
}

/// Build a [`Handler`] from an async function or closure.
pub fn handler_fn<T, R, E, F, Fut>(f: F) -> Handler<T, R>
where
    T: 'static,
    R: 'static,
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    Arc::new(move |ctx: Context, input: T| -> HandlerFuture<R> {
        let fut = f(ctx, input);
        Box::pin(async move { fut.await.map_err(Into::into) })
    })
}
