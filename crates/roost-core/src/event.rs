//! Server event payload types.
//!
//! The notify server pushes named events over the stream. Message-like
//! bodies are open: the server may add fields at any time, so everything
//! beyond the identifiers is carried as a raw JSON map. The transport tags
//! each body with the event name under [`EVENT_FIELD`]; that tag is
//! bookkeeping and is stripped before a payload reaches the store.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Wire name of the transport bookkeeping field carried in event bodies.
pub const EVENT_FIELD: &str = "event";

/// Channel ids arrive as JSON strings or numbers depending on the server
/// version; normalize both to a string key.
fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invalid id value: {other}"
        ))),
    }
}

/// A chat message as delivered on the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Channel the message belongs to (wire name `chatId`)
    #[serde(rename = "chatId", deserialize_with = "de_id")]
    pub chat_id: String,
    /// Every other message field, verbatim
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ChatMessage {
    /// Parse a raw `NewMessage` body.
    ///
    /// Strips the transport [`EVENT_FIELD`] so it can never leak into
    /// stored message records. Fails when `chatId` is missing or unusable.
    pub fn parse(data: &str) -> serde_json::Result<Self> {
        let mut message: Self = serde_json::from_str(data)?;
        message.fields.remove(EVENT_FIELD);
        Ok(message)
    }

    /// Read one of the open message fields
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Body of a `UserJoinedWorkspace` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserJoined {
    /// Display name of the joining user
    pub user_name: String,
    /// Contact identifier of the joining user
    pub user_email: String,
    /// Workspace name, when the server includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
}

impl UserJoined {
    /// Parse a raw `UserJoinedWorkspace` body.
    pub fn parse(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    /// Human-readable line shown to the user.
    #[must_use]
    pub fn notice(&self) -> String {
        format!(
            "{} ({}) joined the workspace",
            self.user_name, self.user_email
        )
    }
}

/// A chat roster entry, delivered by `NewChat` / `AddToChat` /
/// `RemoveFromChat` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatInfo {
    /// Roster key
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Every other chat field, verbatim
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ChatInfo {
    /// Parse a raw roster event body, stripping the transport tag.
    pub fn parse(data: &str) -> serde_json::Result<Self> {
        let mut chat: Self = serde_json::from_str(data)?;
        chat.fields.remove(EVENT_FIELD);
        Ok(chat)
    }
}

/// Body of a `WorkspaceUpdated` / `WorkspaceDeleted` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceChange {
    /// Workspace identifier
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Workspace name
    pub name: String,
}

impl WorkspaceChange {
    /// Parse a raw workspace event body.
    pub fn parse(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}
