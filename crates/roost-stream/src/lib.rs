//! Roost Stream - Server-Push Event Layer
//!
//! One long-lived SSE connection per session, decoded into named frames
//! and routed through a dispatch table of pure handlers:
//! - SSE: the wire decoder
//! - Dispatch: string-keyed handler table with a mandatory default entry
//! - Handlers: translations from event bodies to store mutations and
//!   notifications
//! - Client: the connection itself (single attempt, caller-owned lifetime)
//! - Supervisor: opt-in reconnection with backoff, outside the client

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod sse;
pub mod supervisor;

pub use client::{CloseReason, EventStream, StreamHandle, StreamState};
pub use dispatch::{Dispatcher, Effect, EventHandler, HandlerError, LogOnlyHandler};
pub use error::{Error, Result};
pub use handlers::{
    events, ChatRemovedHandler, ChatUpsertHandler, NewMessageHandler, UserJoinedHandler,
    WorkspaceDeletedHandler, WorkspaceUpdatedHandler,
};
pub use sse::{FrameDecoder, SseFrame, DEFAULT_EVENT};
pub use supervisor::StreamSupervisor;
