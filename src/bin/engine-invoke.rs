use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use gateway_engine::apigw::{v1, v2};
use gateway_engine::config::LoggingConfig;
use gateway_engine::decorators::{LogEvent, PanicRecover};
use gateway_engine::observability::logging::init_logging;
use gateway_engine::{echo, BoxError, Context, Handler, LocalEngine};

#[derive(Parser)]
#[command(name = "engine-invoke")]
#[command(about = "Invoke the echo service locally with an API Gateway proxy event", long_about = None)]
struct Cli {
    /// Path to the event JSON file
    event: PathBuf,

    /// Payload format of the event
    #[arg(short, long, value_enum, default_value_t = Format::Auto)]
    format: Format,

    /// Invocation request id (random when omitted)
    #[arg(short, long)]
    request_id: Option<String>,

    /// Pretty-print the response
    #[arg(short, long)]
    pretty: bool,

    /// Log each invocation to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Detect from the event's `version` field
    Auto,
    /// REST API, payload format 1.0
    V1,
    /// HTTP API, payload format 2.0
    V2,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    if cli.verbose {
        init_logging(&LoggingConfig {
            filter: "gateway_engine=debug".to_string(),
            ..LoggingConfig::default()
        });
    }

    let raw = std::fs::read_to_string(&cli.event)?;
    let event: Value = serde_json::from_str(&raw)?;

    let format = match cli.format {
        Format::Auto if event.get("version").and_then(Value::as_str) == Some("2.0") => Format::V2,
        Format::Auto => Format::V1,
        other => other,
    };

    let ctx = Context::new(
        cli.request_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    );

    match format {
        Format::V2 => {
            let event: v2::HttpRequest = serde_json::from_value(event)?;
            let response = invoke(ctx, event, v2::handler(echo::router())).await?;
            print_response(&response, cli.pretty)
        }
        _ => {
            let event: v1::ProxyRequest = serde_json::from_value(event)?;
            let response = invoke(ctx, event, v1::handler(echo::router())).await?;
            print_response(&response, cli.pretty)
        }
    }
}

async fn invoke<T, R>(ctx: Context, event: T, handler: Handler<T, R>) -> Result<R, BoxError>
where
    T: Clone + std::fmt::Debug + Send + Sync + 'static,
    R: std::fmt::Debug + Send + 'static,
{
    LocalEngine::new(ctx, event, handler)
        .decorate(LogEvent::new())
        .decorate(PanicRecover::new())
        .run()
        .await
}

fn print_response<R: Serialize>(response: &R, pretty: bool) -> Result<(), BoxError> {
    let out = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    println!("{out}");
    Ok(())
}
