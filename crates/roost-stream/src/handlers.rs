//! Handlers for the named events the notify server pushes.
//!
//! Each handler is a pure translation from a raw body to effects; the
//! dispatch layer owns error containment and the stream client owns
//! applying the effects. Message-shaped events become store mutations,
//! people/workspace events become notifications.

use crate::dispatch::{Dispatcher, Effect, EventHandler, HandlerError};
use roost_core::{
    ChatInfo, ChatMessage, Notification, NotificationKind, StoreMutation, UserJoined,
    WorkspaceChange,
};
use tracing::{debug, info};

/// Event names as they appear on the wire.
pub mod events {
    /// A chat message was posted
    pub const NEW_MESSAGE: &str = "NewMessage";
    /// A user joined the workspace
    pub const USER_JOINED_WORKSPACE: &str = "UserJoinedWorkspace";
    /// A chat was created
    pub const NEW_CHAT: &str = "NewChat";
    /// The caller was added to a chat, or its members changed
    pub const ADD_TO_CHAT: &str = "AddToChat";
    /// The caller was removed from a chat
    pub const REMOVE_FROM_CHAT: &str = "RemoveFromChat";
    /// Workspace metadata changed
    pub const WORKSPACE_UPDATED: &str = "WorkspaceUpdated";
    /// The workspace was deleted
    pub const WORKSPACE_DELETED: &str = "WorkspaceDeleted";
}

/// `NewMessage`: append the message to its channel.
///
/// The transport tag is stripped during parsing and never reaches the
/// store. Deliveries are not deduplicated; a repeated message is appended
/// again.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewMessageHandler;

impl EventHandler for NewMessageHandler {
    fn handle(&self, data: &str) -> Result<Vec<Effect>, HandlerError> {
        let message = ChatMessage::parse(data)?;
        debug!(channel_id = %message.chat_id, "message received");
        Ok(vec![Effect::Mutate(StoreMutation::AppendMessage {
            channel_id: message.chat_id.clone(),
            message,
        })])
    }
}

/// `UserJoinedWorkspace`: display-only, no store mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserJoinedHandler;

impl EventHandler for UserJoinedHandler {
    fn handle(&self, data: &str) -> Result<Vec<Effect>, HandlerError> {
        let joined = UserJoined::parse(data)?;
        let notice = joined.notice();
        info!(notice = %notice, "user joined workspace");
        Ok(vec![Effect::Notify(Notification::new(
            NotificationKind::UserJoined,
            notice,
        ))])
    }
}

/// `NewChat` / `AddToChat`: upsert the chat roster entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatUpsertHandler;

impl EventHandler for ChatUpsertHandler {
    fn handle(&self, data: &str) -> Result<Vec<Effect>, HandlerError> {
        let chat = ChatInfo::parse(data)?;
        debug!(chat_id = %chat.id, "chat roster upsert");
        Ok(vec![Effect::Mutate(StoreMutation::UpsertChat(chat))])
    }
}

/// `RemoveFromChat`: drop the chat roster entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatRemovedHandler;

impl EventHandler for ChatRemovedHandler {
    fn handle(&self, data: &str) -> Result<Vec<Effect>, HandlerError> {
        let chat = ChatInfo::parse(data)?;
        debug!(chat_id = %chat.id, "chat roster removal");
        Ok(vec![Effect::Mutate(StoreMutation::RemoveChat {
            chat_id: chat.id,
        })])
    }
}

/// `WorkspaceUpdated`: display-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceUpdatedHandler;

impl EventHandler for WorkspaceUpdatedHandler {
    fn handle(&self, data: &str) -> Result<Vec<Effect>, HandlerError> {
        let change = WorkspaceChange::parse(data)?;
        Ok(vec![Effect::Notify(Notification::new(
            NotificationKind::Workspace,
            format!("workspace \"{}\" was updated", change.name),
        ))])
    }
}

/// `WorkspaceDeleted`: display-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceDeletedHandler;

impl EventHandler for WorkspaceDeletedHandler {
    fn handle(&self, data: &str) -> Result<Vec<Effect>, HandlerError> {
        let change = WorkspaceChange::parse(data)?;
        Ok(vec![Effect::Notify(Notification::new(
            NotificationKind::Workspace,
            format!("workspace \"{}\" was deleted", change.name),
        ))])
    }
}

impl Dispatcher {
    /// Dispatch table covering every event the notify server emits, with
    /// the log-only default for anything it grows later.
    #[must_use]
    pub fn with_default_handlers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(events::NEW_MESSAGE, NewMessageHandler);
        dispatcher.register(events::USER_JOINED_WORKSPACE, UserJoinedHandler);
        dispatcher.register(events::NEW_CHAT, ChatUpsertHandler);
        dispatcher.register(events::ADD_TO_CHAT, ChatUpsertHandler);
        dispatcher.register(events::REMOVE_FROM_CHAT, ChatRemovedHandler);
        dispatcher.register(events::WORKSPACE_UPDATED, WorkspaceUpdatedHandler);
        dispatcher.register(events::WORKSPACE_DELETED, WorkspaceDeletedHandler);
        dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::SseFrame;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: Some(event.to_string()),
            data: data.to_string(),
            id: None,
        }
    }

    #[test]
    fn test_new_message_round_trip() {
        let effects = NewMessageHandler
            .handle(r#"{"chatId": "c1", "text": "hi", "event": "NewMessage"}"#)
            .unwrap();

        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Mutate(StoreMutation::AppendMessage {
                channel_id,
                message,
            }) => {
                assert_eq!(channel_id, "c1");
                assert!(message.field("event").is_none());
                assert_eq!(message.field("text"), Some(&"hi".into()));
            }
            other => panic!("expected AppendMessage, got: {:?}", other),
        }
    }

    #[test]
    fn test_new_message_malformed_body() {
        assert!(NewMessageHandler.handle("{not json").is_err());
    }

    #[test]
    fn test_user_joined_notifies_without_mutation() {
        let effects = UserJoinedHandler
            .handle(r#"{"user_name": "Ann", "user_email": "ann@x.com"}"#)
            .unwrap();

        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Notify(notification) => {
                assert!(notification.text.contains("Ann"));
                assert!(notification.text.contains("ann@x.com"));
                assert_eq!(notification.kind, NotificationKind::UserJoined);
            }
            other => panic!("expected Notify, got: {:?}", other),
        }
    }

    #[test]
    fn test_chat_upsert_and_remove() {
        let upsert = ChatUpsertHandler
            .handle(r#"{"id": 3, "name": "general", "event": "NewChat"}"#)
            .unwrap();
        assert!(matches!(
            &upsert[0],
            Effect::Mutate(StoreMutation::UpsertChat(chat)) if chat.id == "3"
        ));

        let removal = ChatRemovedHandler.handle(r#"{"id": 3}"#).unwrap();
        assert!(matches!(
            &removal[0],
            Effect::Mutate(StoreMutation::RemoveChat { chat_id }) if chat_id == "3"
        ));
    }

    #[test]
    fn test_workspace_events_notify_only() {
        let updated = WorkspaceUpdatedHandler
            .handle(r#"{"id": 1, "name": "acme"}"#)
            .unwrap();
        assert!(matches!(&updated[0], Effect::Notify(n) if n.text.contains("acme")));

        let deleted = WorkspaceDeletedHandler
            .handle(r#"{"id": 1, "name": "acme"}"#)
            .unwrap();
        assert!(matches!(&deleted[0], Effect::Notify(n) if n.text.contains("deleted")));
    }

    #[test]
    fn test_default_table_covers_server_events() {
        let dispatcher = Dispatcher::with_default_handlers();
        for event in [
            events::NEW_MESSAGE,
            events::USER_JOINED_WORKSPACE,
            events::NEW_CHAT,
            events::ADD_TO_CHAT,
            events::REMOVE_FROM_CHAT,
            events::WORKSPACE_UPDATED,
            events::WORKSPACE_DELETED,
        ] {
            assert!(dispatcher.handles(event), "missing handler for {event}");
        }
    }

    #[test]
    fn test_malformed_frame_does_not_affect_next() {
        let dispatcher = Dispatcher::with_default_handlers();

        let bad = dispatcher.dispatch(&frame(events::NEW_MESSAGE, "{oops"));
        assert!(bad.is_empty());

        let good = dispatcher.dispatch(&frame(
            events::NEW_MESSAGE,
            r#"{"chatId": "c1", "text": "still fine"}"#,
        ));
        assert_eq!(good.len(), 1);
    }

    #[test]
    fn test_unknown_event_through_full_table() {
        let dispatcher = Dispatcher::with_default_handlers();
        let effects = dispatcher.dispatch(&frame("SomethingNew", r#"{"whatever": true}"#));
        assert!(effects.is_empty());
    }
}
