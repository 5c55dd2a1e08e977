//! Handler composition engine.
//!
//! # Data Flow
//! ```text
//! Engine::new(handler)
//!     → decorate(A).decorate(B)      (registration order)
//!     → into_handler()               (fold in reverse: A(B(handler)))
//!     → runtime loop / LocalEngine   (invoke with Context + input)
//! ```
//!
//! # Design Decisions
//! - Handlers are type-erased `Arc<dyn Fn>` so decorators can wrap any of them
//! - Folding consumes the engine; decorators can never be applied twice
//! - The first registered decorator is the outermost wrapper

pub mod builder;
pub mod context;
pub mod handler;
pub mod local;

pub use builder::Engine;
pub use context::Context;
pub use handler::{handler_fn, Decorator, Handler, HandlerFuture};
pub use local::LocalEngine;
