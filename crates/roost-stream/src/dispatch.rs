//! Event dispatch table.
//!
//! Incoming frames are routed by event name through a string-keyed table
//! with a mandatory default entry. New event types are supported by
//! registering a handler, never by editing the dispatch logic. A handler
//! failure is contained here: the frame is dropped and logged, the
//! connection and every subsequent frame are unaffected.

use crate::sse::SseFrame;
use roost_core::{Notification, StoreMutation};
use std::collections::HashMap;
use tracing::{debug, error, trace};

/// Output of one handled event.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Mutate the shared state store
    Mutate(StoreMutation),
    /// Surface a display-only notification
    Notify(Notification),
}

/// Failure to translate one event body.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HandlerError(
    /// What went wrong
    pub String,
);

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

/// A pure translation from one event body to effects.
///
/// Handlers run synchronously on the stream read loop and must not block;
/// the connection cannot drain frames while a handler is running.
pub trait EventHandler: Send + Sync {
    /// Translate a raw event body
    fn handle(&self, data: &str) -> std::result::Result<Vec<Effect>, HandlerError>;
}

impl<F> EventHandler for F
where
    F: Fn(&str) -> std::result::Result<Vec<Effect>, HandlerError> + Send + Sync,
{
    fn handle(&self, data: &str) -> std::result::Result<Vec<Effect>, HandlerError> {
        self(data)
    }
}

/// Default entry of the dispatch table: drop the body, leave a trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyHandler;

impl EventHandler for LogOnlyHandler {
    fn handle(&self, data: &str) -> std::result::Result<Vec<Effect>, HandlerError> {
        trace!(body = data, "dropping event body");
        Ok(Vec::new())
    }
}

/// String-keyed handler table with a mandatory default entry.
pub struct Dispatcher {
    handlers: HashMap<String, Box<dyn EventHandler>>,
    default: Box<dyn EventHandler>,
}

impl Dispatcher {
    /// Create an empty table whose default entry only logs
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            default: Box::new(LogOnlyHandler),
        }
    }

    /// Register a handler for an event name
    pub fn register(&mut self, event: impl Into<String>, handler: impl EventHandler + 'static) {
        self.handlers.insert(event.into(), Box::new(handler));
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with_handler(
        mut self,
        event: impl Into<String>,
        handler: impl EventHandler + 'static,
    ) -> Self {
        self.register(event, handler);
        self
    }

    /// Replace the default entry
    #[must_use]
    pub fn with_default(mut self, handler: impl EventHandler + 'static) -> Self {
        self.default = Box::new(handler);
        self
    }

    /// Whether a handler is registered for the event name
    #[must_use]
    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Route one frame.
    ///
    /// Unregistered event names (including the implicit `message` channel)
    /// go to the default entry. A handler error yields zero effects; it
    /// never propagates.
    pub fn dispatch(&self, frame: &SseFrame) -> Vec<Effect> {
        let name = frame.event_name();
        let handler = match self.handlers.get(name) {
            Some(handler) => handler,
            None => {
                debug!(event = name, "unregistered event type, ignoring");
                &self.default
            }
        };

        match handler.handle(&frame.data) {
            Ok(effects) => effects,
            Err(e) => {
                error!(event = name, error = %e, "failed to handle event, frame dropped");
                Vec::new()
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: Option<&str>, data: &str) -> SseFrame {
        SseFrame {
            event: event.map(str::to_string),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn test_registered_handler_runs() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("Ping", |_: &str| -> Result<Vec<Effect>, HandlerError> {
            Ok(vec![Effect::Mutate(StoreMutation::ClearToken)])
        });

        let effects = dispatcher.dispatch(&frame(Some("Ping"), "{}"));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_unknown_event_yields_nothing() {
        let dispatcher = Dispatcher::new();
        let effects = dispatcher.dispatch(&frame(Some("SomethingNew"), r#"{"any": "body"}"#));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_default_channel_goes_to_default_entry() {
        let dispatcher = Dispatcher::new();
        let effects = dispatcher.dispatch(&frame(None, "free-form"));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_handler_error_is_contained() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("Bad", |_: &str| -> Result<Vec<Effect>, HandlerError> {
            Err(HandlerError("always fails".to_string()))
        });
        dispatcher.register("Good", |_: &str| -> Result<Vec<Effect>, HandlerError> {
            Ok(vec![Effect::Mutate(StoreMutation::ClearToken)])
        });

        assert!(dispatcher.dispatch(&frame(Some("Bad"), "{}")).is_empty());
        // The failure does not poison later dispatches.
        assert_eq!(dispatcher.dispatch(&frame(Some("Good"), "{}")).len(), 1);
    }

    #[test]
    fn test_custom_default_entry() {
        let dispatcher =
            Dispatcher::new().with_default(|_: &str| -> Result<Vec<Effect>, HandlerError> {
                Ok(vec![Effect::Notify(Notification::new(
                    roost_core::NotificationKind::System,
                    "caught by default",
                ))])
            });

        let effects = dispatcher.dispatch(&frame(Some("Unknown"), "{}"));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_handles() {
        let dispatcher = Dispatcher::new().with_handler("Known", LogOnlyHandler);
        assert!(dispatcher.handles("Known"));
        assert!(!dispatcher.handles("Unknown"));
    }
}
