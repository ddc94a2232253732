//! Roost Core - Client Kernel
//!
//! Shared pieces of the Roost chat client:
//! - Config: endpoint resolution from the host channel, with defaults
//! - Session: persisted token and the authentication predicate
//! - Store: process-wide channel state behind a narrow mutation interface
//! - Event: server event payload types
//! - Notify: broadcast seam for display-only events
//! - Reconnect: backoff policy for callers that opt into reconnection

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;
pub mod notify;
pub mod reconnect;
pub mod session;
pub mod store;

pub use config::{
    endpoints, init_endpoints, ConfigResponse, ConfigSource, EndpointConfig, FileConfigSource,
    NullConfigSource, ServerSection, DEFAULT_CHAT_BASE, DEFAULT_NOTIFICATION_BASE,
};
pub use error::{Error, Result};
pub use event::{ChatInfo, ChatMessage, UserJoined, WorkspaceChange, EVENT_FIELD};
pub use notify::{Notification, NotificationBus, NotificationKind};
pub use reconnect::ReconnectPolicy;
pub use session::{FileBackend, MemoryBackend, SessionBackend, SessionStore, SESSION_KEY};
pub use store::{StateStore, StoreMutation};
