//! Runtime loop tests against a mock Lambda Runtime API.

use std::sync::{Arc, Mutex};

use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

use gateway_engine::apigw::v2;
use gateway_engine::config::loader::RUNTIME_API_ENV;
use gateway_engine::config::RetryConfig;
use gateway_engine::decorators::{LogEvent, PanicRecover};
use gateway_engine::runtime::Runtime;
use gateway_engine::{echo, handler_fn, BoxError, Context, Engine, Error, Handler};

mod common;
use common::{v2_event, MockRuntime, PostKind};

fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        base_delay_ms: 1,
        max_delay_ms: 5,
    }
}

fn echo_handler() -> Handler<v2::HttpRequest, v2::HttpResponse> {
    Engine::new(v2::handler(echo::router()))
        .decorate(LogEvent::new())
        .decorate(PanicRecover::new())
        .into_handler()
}

#[tokio::test]
async fn test_process_next_posts_response() {
    let mock = MockRuntime::start().await;
    mock.push_event("inv-1", &v2_event("GET", "/hello", "a=1"));

    let runtime = Runtime::new(&mock.api(), fast_retry(3)).unwrap();
    runtime.process_next(&echo_handler()).await.unwrap();

    let posts = mock.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].kind, PostKind::Response);
    assert_eq!(posts[0].request_id.as_deref(), Some("inv-1"));

    let response = &posts[0].body;
    assert_eq!(response["statusCode"], 200);
    let echo: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    assert_eq!(echo["path"], "/hello");
    assert_eq!(echo["query"], "a=1");
    assert_eq!(echo["requestId"], "inv-1");
    assert_eq!(echo["sourceIp"], "192.0.2.10");
}

#[tokio::test]
async fn test_handler_error_is_reported() {
    let mock = MockRuntime::start().await;
    mock.push_event("inv-2", &json!({"n": 1}));

    let handler = handler_fn(|_ctx, _evt: Value| async move {
        Err::<Value, _>(BoxError::from("handler refused"))
    });

    let runtime = Runtime::new(&mock.api(), fast_retry(3)).unwrap();
    runtime.process_next(&handler).await.unwrap();

    let posts = mock.posts();
    assert_eq!(posts[0].kind, PostKind::Error);
    assert_eq!(posts[0].error_type_header.as_deref(), Some("HandlerError"));
    assert_eq!(posts[0].body["errorType"], "HandlerError");
    assert_eq!(posts[0].body["errorMessage"], "handler refused");
}

#[tokio::test]
async fn test_recovered_panic_is_reported() {
    let mock = MockRuntime::start().await;
    mock.push_event("inv-3", &v2_event("GET", "/boom", ""));

    let router = Router::new().route(
        "/boom",
        get(|| async {
            if true {
                panic!("boom");
            }
            "unreachable"
        }),
    );
    let handler = Engine::new(v2::handler(router))
        .decorate(PanicRecover::new())
        .into_handler();

    let runtime = Runtime::new(&mock.api(), fast_retry(3)).unwrap();
    runtime.process_next(&handler).await.unwrap();

    let posts = mock.posts();
    assert_eq!(posts[0].kind, PostKind::Error);
    assert_eq!(posts[0].body["errorType"], "PanicRecoveredError");
    assert_eq!(posts[0].body["errorMessage"], "panic: boom");
}

#[tokio::test]
async fn test_undecodable_event_is_reported() {
    let mock = MockRuntime::start().await;
    mock.push_raw("inv-4", "not json", None);

    let runtime = Runtime::new(&mock.api(), fast_retry(3)).unwrap();
    runtime.process_next(&echo_handler()).await.unwrap();

    let posts = mock.posts();
    assert_eq!(posts[0].kind, PostKind::Error);
    assert_eq!(posts[0].body["errorType"], "SerializationError");
}

#[tokio::test]
async fn test_context_from_invocation_headers() {
    let mock = MockRuntime::start().await;
    mock.push_traced_event("inv-5", &json!({}), "Root=1-5759e988-bd862e3fe1be46a994272793");

    let seen: Arc<Mutex<Option<Context>>> = Arc::default();
    let sink = seen.clone();
    let handler = handler_fn(move |ctx: Context, _evt: Value| {
        let sink = sink.clone();
        async move {
            *sink.lock().unwrap() = Some(ctx);
            Ok::<_, BoxError>(json!({"ok": true}))
        }
    });

    let runtime = Runtime::new(&mock.api(), fast_retry(3)).unwrap();
    runtime.process_next(&handler).await.unwrap();

    let ctx = seen.lock().unwrap().clone().unwrap();
    assert_eq!(ctx.request_id, "inv-5");
    assert_eq!(
        ctx.trace_id.as_deref(),
        Some("Root=1-5759e988-bd862e3fe1be46a994272793")
    );
    assert!(ctx.invoked_function_arn.ends_with(":function:test"));
    assert!(ctx.remaining().is_some());

    assert_eq!(mock.posts()[0].body, json!({"ok": true}));
}

#[tokio::test]
async fn test_run_stops_after_retry_budget() {
    let mock = MockRuntime::start().await;
    mock.push_event("inv-6", &v2_event("GET", "/", ""));
    mock.push_event("inv-7", &v2_event("POST", "/", ""));

    let runtime = Runtime::new(&mock.api(), fast_retry(3)).unwrap();
    let err = runtime.run(echo_handler()).await.unwrap_err();

    assert!(matches!(err, Error::RuntimeStatus { status: 500, .. }));
    // two invocations, then three failed polls
    assert_eq!(mock.polls(), 5);

    let ids: Vec<_> = mock
        .posts()
        .into_iter()
        .map(|p| p.request_id.unwrap())
        .collect();
    assert_eq!(ids, vec!["inv-6", "inv-7"]);
}

#[tokio::test]
async fn test_init_error_report() {
    let mock = MockRuntime::start().await;
    let runtime = Runtime::new(&mock.api(), fast_retry(1)).unwrap();

    let report = gateway_engine::runtime::ErrorReport::from_error(&Error::NoRuntime);
    runtime.client().send_init_error(&report).await.unwrap();

    let posts = mock.posts();
    assert_eq!(posts[0].kind, PostKind::InitError);
    assert_eq!(posts[0].error_type_header.as_deref(), Some("NoRuntimeError"));
}

#[tokio::test]
async fn test_engine_without_runtime() {
    if std::env::var(RUNTIME_API_ENV).is_ok() {
        return;
    }

    let err = Engine::new(echo_handler()).run().await.unwrap_err();
    assert!(matches!(err, Error::NoRuntime));
}
