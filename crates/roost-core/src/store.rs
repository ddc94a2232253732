//! Shared State Store
//!
//! Process-wide mutable state: per-channel message sequences, the chat
//! roster, and the current session token. Callers never reach into the
//! fields; every change goes through [`StateStore::apply`] with a narrow
//! mutation vocabulary, so the write lock is held only for the duration of
//! a single mutation call.

use crate::event::{ChatInfo, ChatMessage};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// A single mutation against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreMutation {
    /// Append a message to its channel's sequence, preserving arrival
    /// order.
    ///
    /// Delivery is at-least-once and not deduplicated: the same message
    /// delivered twice is appended twice.
    AppendMessage {
        /// Target channel
        channel_id: String,
        /// Message record (transport tag already stripped)
        message: ChatMessage,
    },
    /// Insert or replace a chat roster entry
    UpsertChat(ChatInfo),
    /// Drop a chat roster entry
    RemoveChat {
        /// Roster key
        chat_id: String,
    },
    /// Replace the session token
    SetToken(String),
    /// Invalidate the session token
    ClearToken,
}

#[derive(Debug, Default)]
struct StoreInner {
    channels: HashMap<String, Vec<ChatMessage>>,
    chats: HashMap<String, ChatInfo>,
    token: Option<String>,
}

/// Process-wide shared state store.
#[derive(Debug, Default)]
pub struct StateStore {
    inner: RwLock<StoreInner>,
}

impl StateStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one mutation. The write lock is held only for this call.
    pub fn apply(&self, mutation: StoreMutation) {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        match mutation {
            StoreMutation::AppendMessage {
                channel_id,
                message,
            } => {
                debug!(channel_id = %channel_id, "append message");
                inner.channels.entry(channel_id).or_default().push(message);
            }
            StoreMutation::UpsertChat(chat) => {
                inner.chats.insert(chat.id.clone(), chat);
            }
            StoreMutation::RemoveChat { chat_id } => {
                inner.chats.remove(&chat_id);
            }
            StoreMutation::SetToken(token) => {
                inner.token = Some(token);
            }
            StoreMutation::ClearToken => {
                inner.token = None;
            }
        }
    }

    /// Messages of a channel, in arrival order. Unknown channels are empty.
    #[must_use]
    pub fn messages(&self, channel_id: &str) -> Vec<ChatMessage> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.channels.get(channel_id).cloned().unwrap_or_default()
    }

    /// Number of messages held for a channel
    #[must_use]
    pub fn message_count(&self, channel_id: &str) -> usize {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.channels.get(channel_id).map_or(0, Vec::len)
    }

    /// Current chat roster entries
    #[must_use]
    pub fn chats(&self) -> Vec<ChatInfo> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.chats.values().cloned().collect()
    }

    /// Current session token
    #[must_use]
    pub fn token(&self) -> Option<String> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.token.clone()
    }
}
