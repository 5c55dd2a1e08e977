//! Gateway engine bootstrap.
//!
//! ```text
//!     Runtime API ──next──▶ runtime loop ──▶ LogEvent ──▶ PanicRecover ──▶ v2 bridge
//!                                                                          │
//!                                                                          ▼
//!     Runtime API ◀──response── runtime loop ◀── HttpResponse ◀── echo router
//! ```
//!
//! Serves the built-in echo router behind an HTTP API (payload format 2.0)
//! integration. Configuration comes from the host environment, optionally
//! layered over the TOML file named by `GATEWAY_ENGINE_CONFIG`.

use std::process::ExitCode;

use gateway_engine::apigw::v2;
use gateway_engine::config::loader::{from_env, RUNTIME_API_ENV};
use gateway_engine::decorators::{LogEvent, PanicRecover};
use gateway_engine::observability::logging::init_logging;
use gateway_engine::runtime::{ErrorReport, RuntimeClient};
use gateway_engine::{echo, Engine, Error};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match from_env() {
        Ok(config) => config,
        Err(e) => {
            let err = Error::from(e);
            eprintln!("gateway-engine: {err}");
            report_init_error(&err).await;
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        function = config.runtime.function_name.as_deref().unwrap_or("-"),
        max_body_bytes = config.runtime.max_body_bytes,
        "gateway-engine starting"
    );

    let handler = v2::handler_with_limit(echo::router(), config.runtime.max_body_bytes);
    let engine = Engine::new(handler)
        .decorate(LogEvent::new())
        .decorate(PanicRecover::new());

    match engine.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Engine stopped");
            ExitCode::FAILURE
        }
    }
}

/// Tell the host why startup failed, when there is a host to tell.
async fn report_init_error(err: &Error) {
    let Ok(api) = std::env::var(RUNTIME_API_ENV) else {
        return;
    };

    let sent = match RuntimeClient::new(&api) {
        Ok(client) => client.send_init_error(&ErrorReport::from_error(err)).await,
        Err(e) => Err(e),
    };
    if let Err(e) = sent {
        eprintln!("gateway-engine: reporting init error failed: {e}");
    }
}
