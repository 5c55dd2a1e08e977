//! Host runtime loop.
//!
//! # Data Flow
//! ```text
//! client.next_invocation()      (blocks until the host has work)
//!     → serde_json::from_slice   (event T)
//!     → composed handler         (Context, T) → R
//!     → send_response / send_error
//!     → metrics::record_invocation
//! ```
//!
//! # Design Decisions
//! - One invocation at a time; the host never overlaps them in one process
//! - Handler and event failures are reported to the host and the loop goes on
//! - Runtime API failures are retried with backoff, then end the loop
//! - A panic that no decorator contains unwinds out of `run`

mod backoff;
pub mod client;

use std::time::Instant;

use serde::{de::DeserializeOwned, Serialize};

use crate::config::RetryConfig;
use crate::engine::Handler;
use crate::error::{Error, Result};
use crate::observability::metrics::{record_invocation, record_poll_failure, Outcome};

pub use client::{ErrorReport, Invocation, RuntimeClient};

/// Drives a composed handler against the runtime API.
#[derive(Debug, Clone)]
pub struct Runtime {
    client: RuntimeClient,
    retry: RetryConfig,
}

impl Runtime {
    pub fn new(api: &str, retry: RetryConfig) -> Result<Self> {
        Ok(Self {
            client: RuntimeClient::new(api)?,
            retry,
        })
    }

    pub fn client(&self) -> &RuntimeClient {
        &self.client
    }

    /// Fetch, handle and answer exactly one invocation.
    ///
    /// Errors only when the runtime API itself fails.
    pub async fn process_next<T, R>(&self, handler: &Handler<T, R>) -> Result<()>
    where
        T: DeserializeOwned,
        R: Serialize,
    {
        let invocation = self.client.next_invocation().await?;
        let ctx = invocation.context;
        let request_id = ctx.request_id.clone();
        let start = Instant::now();

        let event: T = match serde_json::from_slice(&invocation.body) {
            Ok(event) => event,
            Err(e) => {
                let err = Error::Serialization(e);
                tracing::warn!(request_id = %request_id, error = %err, "Rejecting undecodable event");
                self.client
                    .send_error(&request_id, &ErrorReport::from_error(&err))
                    .await?;
                record_invocation(Outcome::Error, start);
                return Ok(());
            }
        };

        let result = handler(ctx, event).await;

        let body = result.and_then(|response| serde_json::to_vec(&response).map_err(Into::into));
        match body {
            Ok(body) => {
                self.client.send_response(&request_id, body).await?;
                record_invocation(Outcome::Success, start);
                tracing::debug!(
                    request_id = %request_id,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Invocation complete"
                );
            }
            Err(err) => {
                tracing::error!(request_id = %request_id, error = %err, "Invocation failed");
                self.client
                    .send_error(&request_id, &ErrorReport::from_handler(&err))
                    .await?;
                record_invocation(Outcome::Error, start);
            }
        }

        Ok(())
    }

    /// Serve invocations until the runtime API keeps failing.
    ///
    /// Gives up after `retry.max_attempts` consecutive failures and returns
    /// the last error.
    pub async fn run<T, R>(self, handler: Handler<T, R>) -> Result<()>
    where
        T: DeserializeOwned,
        R: Serialize,
    {
        let mut failures = 0u32;

        loop {
            match self.process_next(&handler).await {
                Ok(()) => failures = 0,
                Err(err) => {
                    failures += 1;
                    record_poll_failure();

                    if failures >= self.retry.max_attempts {
                        tracing::error!(
                            attempts = failures,
                            error = %err,
                            "Runtime API unavailable, stopping"
                        );
                        return Err(err);
                    }

                    let delay = self.retry.backoff(failures);
                    tracing::warn!(
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Runtime API call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
