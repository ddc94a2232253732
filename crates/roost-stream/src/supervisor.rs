//! Stream supervision — reconnection as a caller-side policy.
//!
//! The client in [`crate::client`] makes exactly one connection attempt.
//! Callers that want the stream back after a transport failure wrap it in a
//! supervisor, which re-opens fresh streams on a backoff schedule. Keeping
//! this outside the client preserves the single-attempt contract for
//! everyone who did not ask for more.

use crate::client::{CloseReason, EventStream};
use crate::error::Result;
use roost_core::ReconnectPolicy;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Re-opens the event stream after transport failures.
pub struct StreamSupervisor<F> {
    factory: F,
    policy: ReconnectPolicy,
    shutdown: CancellationToken,
}

impl<F> StreamSupervisor<F>
where
    F: FnMut() -> EventStream,
{
    /// Create a supervisor. The factory builds a fresh stream per attempt
    /// (a stream is consumed by opening it).
    #[must_use]
    pub fn new(factory: F, policy: ReconnectPolicy) -> Self {
        Self {
            factory,
            policy,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the supervision loop and closes the live stream
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until shut down, the handle-close path is taken, or the policy
    /// is exhausted.
    pub async fn run(mut self) -> Result<()> {
        let mut attempt: u32 = 0;

        loop {
            let mut handle = (self.factory)().open()?;
            attempt += 1;

            let reason = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    handle.close();
                    let _ = handle.closed().await;
                    return Ok(());
                }
                reason = handle.closed() => reason,
            };

            match reason {
                CloseReason::ClosedByHandle => {
                    info!("stream closed, stopping supervision");
                    return Ok(());
                }
                CloseReason::TransportError(_) | CloseReason::ServerClosed => {
                    if self.policy.exhausted(attempt) {
                        warn!(attempts = attempt, "reconnect attempts exhausted");
                        return Ok(());
                    }

                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        reason = ?reason,
                        "stream lost, reconnecting"
                    );

                    tokio::select! {
                        _ = self.shutdown.cancelled() => return Ok(()),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}
