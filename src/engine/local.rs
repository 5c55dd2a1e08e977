//! In-process invocation with a fixed context and input.
//!
//! Used by tests and by the `engine-invoke` binary to exercise a decorated
//! handler without a host runtime.

use crate::engine::{Context, Decorator, Engine, Handler};
use crate::error::BoxError;

/// An [`Engine`] bound to one context and one input.
pub struct LocalEngine<T, R> {
    ctx: Context,
    input: T,
    engine: Engine<T, R>,
}

impl<T, R> LocalEngine<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    pub fn new(ctx: Context, input: T, handler: Handler<T, R>) -> Self {
        Self {
            ctx,
            input,
            engine: Engine::new(handler),
        }
    }

    pub fn decorate<D>(mut self, decorator: D) -> Self
    where
        D: Decorator<T, R> + 'static,
    {
        self.engine = self.engine.decorate(decorator);
        self
    }

    /// Compose the chain and invoke it once.
    pub async fn run(self) -> Result<R, BoxError> {
        let handler = self.engine.into_handler();
        handler(self.ctx, self.input).await
    }
}
