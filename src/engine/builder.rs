//! Engine construction and bootstrap.

use serde::{de::DeserializeOwned, Serialize};

use crate::config::loader::from_env;
use crate::engine::{Decorator, Handler};
use crate::error::{Error, Result};
use crate::runtime::Runtime;

/// Holds a base handler and the decorators registered around it.
pub struct Engine<T, R> {
    handler: Handler<T, R>,
    decorators: Vec<Box<dyn Decorator<T, R>>>,
}

impl<T, R> Engine<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Create an engine around `handler` with no decorators.
    pub fn new(handler: Handler<T, R>) -> Self {
        Self {
            handler,
            decorators: Vec::new(),
        }
    }

    /// Register a decorator. Earlier registrations end up further out.
    pub fn decorate<D>(mut self, decorator: D) -> Self
    where
        D: Decorator<T, R> + 'static,
    {
        self.decorators.push(Box::new(decorator));
        self
    }

    /// Register several decorators, keeping their order.
    pub fn decorate_all<I>(mut self, decorators: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Decorator<T, R>>>,
    {
        self.decorators.extend(decorators);
        self
    }

    /// Number of registered decorators.
    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Fold the decorators into the handler.
    ///
    /// Registered `[A, B, C]` around `H` yields `A(B(C(H)))`.
    pub fn into_handler(self) -> Handler<T, R> {
        self.decorators
            .into_iter()
            .rev()
            .fold(self.handler, |handler, decorator| decorator.wrap(handler))
    }

    /// Start serving invocations from the host runtime.
    ///
    /// Fails with [`Error::NoRuntime`] when `AWS_LAMBDA_RUNTIME_API` is not
    /// set. Otherwise it only returns on an unrecoverable runtime API error.
    pub async fn run(self) -> Result<()>
    where
        T: DeserializeOwned,
        R: Serialize,
    {
        let config = from_env()?;

        let Some(api) = config.runtime.api.clone() else {
            tracing::error!("AWS_LAMBDA_RUNTIME_API is not set");
            return Err(Error::NoRuntime);
        };

        tracing::info!(
            runtime_api = %api,
            decorators = self.len(),
            "Engine starting"
        );

        let handler = self.into_handler();
        Runtime::new(&api, config.retry)?.run(handler).await
    }
}
