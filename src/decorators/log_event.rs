//! Event/response logging around a handler.

use std::fmt::Debug;
use std::sync::Arc;

use crate::engine::{Context, Decorator, Handler, HandlerFuture};
use crate::error::BoxError;

/// Log hook called after every invocation with the input and the outcome.
pub type LogEventFn<T, R> = Arc<dyn Fn(&Context, &T, &Result<R, BoxError>) + Send + Sync>;

/// Configuration for [`LogEvent`].
pub struct LogEventConfig<T, R> {
    /// Custom log hook. `None` uses [`default_log_fn`].
    pub log_fn: Option<LogEventFn<T, R>>,
}

impl<T, R> Default for LogEventConfig<T, R> {
    fn default() -> Self {
        Self { log_fn: None }
    }
}

impl<T, R> Clone for LogEventConfig<T, R> {
    fn clone(&self) -> Self {
        Self {
            log_fn: self.log_fn.clone(),
        }
    }
}

/// Logs failures at error level and successes at info level.
pub fn default_log_fn<T: Debug, R: Debug>(ctx: &Context, event: &T, result: &Result<R, BoxError>) {
    match result {
        Ok(response) => tracing::info!(
            request_id = %ctx.request_id,
            event = ?event,
            response = ?response,
            "Event processed"
        ),
        Err(error) => tracing::error!(
            request_id = %ctx.request_id,
            error = %error,
            event = ?event,
            "Error occurred"
        ),
    }
}

/// Decorator that reports every invocation to a log hook.
pub struct LogEvent<T, R> {
    config: LogEventConfig<T, R>,
}

impl<T: Debug, R: Debug> LogEvent<T, R> {
    pub fn new() -> Self {
        Self::with_config(LogEventConfig::default())
    }

    pub fn with_config(config: LogEventConfig<T, R>) -> Self {
        Self { config }
    }
}

impl<T: Debug, R: Debug> Default for LogEvent<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> Decorator<T, R> for LogEvent<T, R>
where
    T: Clone + Debug + Send + Sync + 'static,
    R: Debug + Send + 'static,
{
    fn wrap(&self, next: Handler<T, R>) -> Handler<T, R> {
        let log_fn: LogEventFn<T, R> = self
            .config
            .log_fn
            .clone()
            .unwrap_or_else(|| Arc::new(default_log_fn::<T, R>));

        Arc::new(move |ctx: Context, input: T| -> HandlerFuture<R> {
            let next = next.clone();
            let log_fn = log_fn.clone();
            Box::pin(async move {
                let event = input.clone();
                let result = next(ctx.clone(), input).await;
                log_fn(&ctx, &event, &result);
                result
            })
        })
    }
}
