//! Gateway engine library.
//!
//! Runs HTTP handlers behind API Gateway proxy integrations: proxy events
//! become `http::Request`s, handler output is captured and folded back into
//! the proxy response, and handlers are composed with decorators.

// Core subsystems
pub mod apigw;
pub mod engine;
pub mod http;
pub mod runtime;

// Cross-cutting concerns
pub mod config;
pub mod decorators;
pub mod error;
pub mod observability;

pub mod echo;

pub use engine::{handler_fn, Context, Decorator, Engine, Handler, LocalEngine};
pub use error::{BoxError, Error, Result};
