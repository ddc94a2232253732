//! Notifications - display-only events and their broadcast seam.
//!
//! Some stream events carry nothing the store needs; they exist to be shown
//! to the user. Handlers emit them as [`Notification`] values and the
//! [`NotificationBus`] fans them out to whoever cares. The bus never blocks
//! a handler: with no subscribers the notification is silently dropped, and
//! slow subscribers lag rather than stall the publisher.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A user joined the workspace
    UserJoined,
    /// Workspace metadata changed or the workspace was deleted
    Workspace,
    /// Anything else worth surfacing
    System,
}

/// A user-visible notification produced by an event handler.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Unique notification id
    pub id: Uuid,
    /// Category
    pub kind: NotificationKind,
    /// Human-readable text
    pub text: String,
    /// When the client received the underlying event
    pub received_at: DateTime<Utc>,
}

impl Notification {
    /// Create a notification stamped with the current time
    #[must_use]
    pub fn new(kind: NotificationKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// Broadcast fan-out for notifications.
///
/// Callers decide whether to render, queue, or discard what they receive.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Create a bus with the given buffer capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to future notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Publish a notification to all active subscribers.
    ///
    /// Returns the number of subscribers that received it; zero when nobody
    /// is listening.
    pub fn publish(&self, notification: Notification) -> usize {
        // send() errors only when there are no receivers, which is fine
        self.sender.send(notification).unwrap_or(0)
    }

    /// Current number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = NotificationBus::default();
        let mut rx = bus.subscribe();

        let sent = bus.publish(Notification::new(
            NotificationKind::UserJoined,
            "Ann (ann@x.com) joined the workspace",
        ));
        assert_eq!(sent, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind, NotificationKind::UserJoined);
        assert!(received.text.contains("Ann"));
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = NotificationBus::new(8);
        let sent = bus.publish(Notification::new(NotificationKind::System, "nobody home"));
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_receive() {
        let bus = NotificationBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(Notification::new(NotificationKind::Workspace, "renamed"));

        assert_eq!(rx1.recv().await.unwrap().text, "renamed");
        assert_eq!(rx2.recv().await.unwrap().text, "renamed");
    }
}
