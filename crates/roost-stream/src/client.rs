//! The event stream client.
//!
//! Owns one persistent server-push connection per open call. The client is
//! deliberately single-shot: it attempts the connection once, drains frames
//! until the transport fails, the server closes, or the handle is closed,
//! and then stops. It never reconnects on its own; that policy belongs to
//! the caller (see [`crate::supervisor`]).

use crate::dispatch::{Dispatcher, Effect};
use crate::error::{Error, Result};
use crate::sse::{FrameDecoder, SseFrame};
use futures::StreamExt;
use reqwest::header;
use roost_core::{EndpointConfig, NotificationBus, StateStore};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use url::Url;

/// Reason a stream reached its terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// [`StreamHandle::close`] was called
    ClosedByHandle,
    /// Connection-open or mid-stream transport failure.
    ///
    /// The two are intentionally indistinguishable: the contract does not
    /// separate "never connected" from "disconnected".
    TransportError(String),
    /// The server ended the stream cleanly
    ServerClosed,
}

/// Observable connection state, in lifecycle order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    /// Connection attempt in flight
    Connecting,
    /// Connected; frames are being dispatched
    Open,
    /// Terminal: no more frames will be dispatched
    Closed(CloseReason),
}

/// A configured, not-yet-opened event stream.
pub struct EventStream {
    endpoints: EndpointConfig,
    token: String,
    dispatcher: Dispatcher,
    store: Arc<StateStore>,
    bus: NotificationBus,
    client: reqwest::Client,
}

impl EventStream {
    /// Configure a stream with the full default dispatch table.
    #[must_use]
    pub fn new(
        endpoints: EndpointConfig,
        token: impl Into<String>,
        store: Arc<StateStore>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            endpoints,
            token: token.into(),
            dispatcher: Dispatcher::with_default_handlers(),
            store,
            bus,
            client: reqwest::Client::new(),
        }
    }

    /// Replace the dispatch table
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Open the connection.
    ///
    /// Consumes the stream: one configuration, one connection. Re-opening
    /// means building a new `EventStream`, and the prior handle must be
    /// closed first. Fails synchronously only when the token is empty —
    /// a stream must never be opened without a session credential. Every
    /// later failure, including a connection that never establishes,
    /// surfaces as [`CloseReason::TransportError`] on the handle.
    pub fn open(self) -> Result<StreamHandle> {
        if self.token.is_empty() {
            return Err(Error::EmptyToken);
        }

        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(StreamState::Connecting);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let reason = self.run(&state_tx, &task_cancel).await;
            let _ = state_tx.send(StreamState::Closed(reason));
        });

        Ok(StreamHandle {
            cancel,
            state: state_rx,
        })
    }

    /// Stream URL with the session token as a query credential.
    fn stream_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoints.notification_base)
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }

    async fn run(
        &self,
        state: &watch::Sender<StreamState>,
        cancel: &CancellationToken,
    ) -> CloseReason {
        let url = match self.stream_url() {
            Ok(url) => url,
            Err(e) => {
                error!(error = %e, "cannot build stream URL");
                return CloseReason::TransportError(e.to_string());
            }
        };

        // The full URL carries the token; log only the base.
        info!(endpoint = %self.endpoints.notification_base, "opening event stream");

        let request = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/event-stream")
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return CloseReason::ClosedByHandle,
            response = request => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "event stream connection failed");
                return CloseReason::TransportError(e.to_string());
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            error!(status = %status, "event stream rejected");
            return CloseReason::TransportError(format!("unexpected status {status}"));
        }

        let _ = state.send(StreamState::Open);
        debug!("event stream open");

        let mut body = response.bytes_stream();
        let mut decoder = FrameDecoder::new();

        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return CloseReason::ClosedByHandle,
                chunk = body.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => {
                    for frame in decoder.feed(&bytes) {
                        // close() stops dispatch even mid-chunk.
                        if cancel.is_cancelled() {
                            return CloseReason::ClosedByHandle;
                        }
                        self.apply(&frame);
                    }
                }
                Some(Err(e)) => {
                    error!(error = %e, "event stream transport error");
                    return CloseReason::TransportError(e.to_string());
                }
                None => {
                    info!("event stream closed by server");
                    return CloseReason::ServerClosed;
                }
            }
        }
    }

    /// Dispatch one frame and apply its effects, in order, within the same
    /// callback turn.
    fn apply(&self, frame: &SseFrame) {
        for effect in self.dispatcher.dispatch(frame) {
            match effect {
                Effect::Mutate(mutation) => self.store.apply(mutation),
                Effect::Notify(notification) => {
                    self.bus.publish(notification);
                }
            }
        }
    }
}

/// Handle to a live (or closing) stream.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    cancel: CancellationToken,
    state: watch::Receiver<StreamState>,
}

impl StreamHandle {
    /// Close the stream and release the transport.
    ///
    /// Idempotent and safe to call any number of times; dispatch stops at
    /// the current frame boundary.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether the stream has reached its terminal state
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(*self.state.borrow(), StreamState::Closed(_))
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state.borrow().clone()
    }

    /// Wait for the terminal state and return its reason.
    pub async fn closed(&mut self) -> CloseReason {
        loop {
            if let StreamState::Closed(reason) = &*self.state.borrow() {
                return reason.clone();
            }
            if self.state.changed().await.is_err() {
                // Task gone without a terminal state; treat as transport loss.
                return CloseReason::TransportError("stream task ended".to_string());
            }
        }
    }
}
