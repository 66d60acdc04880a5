//! # Notification Sink
//!
//! The single entry point the workflow calls after a state transition.
//! Persists the notification record, then attempts a best-effort
//! real-time push.
//!
//! ## Invariant
//!
//! The sink never fails its caller. A persistence error is logged and
//! reported as `None`; a missing connection is not an error at all — the
//! persisted record satisfies eventual delivery on the recipient's next
//! login or poll.

use std::sync::Arc;

use parking_lot::Mutex;

use ajir_core::{ConnectionId, UserId};

use crate::notification::{Notification, NotificationDraft};
use crate::registry::ConnectionRegistry;
use crate::store::NotificationStore;

/// The push event name notifications are delivered under.
pub const NOTIFICATION_EVENT: &str = "notification";

/// Fire-and-forget real-time delivery to a user's active connection.
///
/// Returns whether the payload was handed to a live connection. `false`
/// is not a failure — it only means the recipient was offline.
pub trait PushChannel: Send + Sync {
    /// Push `payload` to the user's active connection, if any.
    fn send_to_user(&self, user_id: UserId, event: &str, payload: &serde_json::Value) -> bool;
}

/// Persists a notification and requests delivery via a push channel.
pub struct NotificationSink {
    store: Arc<dyn NotificationStore>,
    push: Arc<dyn PushChannel>,
}

impl NotificationSink {
    /// Build a sink over a store and a push channel.
    pub fn new(store: Arc<dyn NotificationStore>, push: Arc<dyn PushChannel>) -> Self {
        Self { store, push }
    }

    /// Persist and deliver a notification.
    ///
    /// Returns the persisted record, or `None` when persistence failed.
    /// No push is attempted for an unpersisted notification — the stored
    /// record is the source of truth the push merely accelerates.
    pub fn notify(&self, draft: NotificationDraft) -> Option<Notification> {
        let notification = Notification::from_draft(draft);
        let recipient_id = notification.recipient_id;

        if let Err(e) = self.store.append(notification.clone()) {
            tracing::warn!(
                recipient = %recipient_id,
                kind = %notification.kind,
                "dropping notification, store append failed: {e}"
            );
            return None;
        }

        match serde_json::to_value(&notification) {
            Ok(payload) => {
                if !self
                    .push
                    .send_to_user(recipient_id, NOTIFICATION_EVENT, &payload)
                {
                    tracing::debug!(
                        recipient = %recipient_id,
                        "no active connection, notification awaits next poll"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    recipient = %recipient_id,
                    "skipping push, notification payload not serializable: {e}"
                );
            }
        }

        Some(notification)
    }

    /// Access the underlying store (recipient-facing feed queries).
    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        &self.store
    }
}

impl std::fmt::Debug for NotificationSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSink").finish_non_exhaustive()
    }
}

// ─── Reference Push Channel ──────────────────────────────────────────

/// A push handed to a live connection.
#[derive(Debug, Clone)]
pub struct PushedMessage {
    /// The recipient.
    pub user_id: UserId,
    /// The connection the payload was routed to.
    pub connection_id: ConnectionId,
    /// The event name.
    pub event: String,
    /// The pushed payload.
    pub payload: serde_json::Value,
}

/// Reference [`PushChannel`] routing through a [`ConnectionRegistry`]
/// and recording what it delivered. The production transport (socket
/// server) is an external collaborator implementing the same trait.
pub struct RecordingPushChannel {
    registry: Arc<ConnectionRegistry>,
    sent: Mutex<Vec<PushedMessage>>,
}

impl RecordingPushChannel {
    /// Build a channel over the given registry.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Everything delivered so far.
    pub fn sent(&self) -> Vec<PushedMessage> {
        self.sent.lock().clone()
    }
}

impl PushChannel for RecordingPushChannel {
    fn send_to_user(&self, user_id: UserId, event: &str, payload: &serde_json::Value) -> bool {
        let Some(connection_id) = self.registry.lookup(user_id) else {
            return false;
        };
        self.sent.lock().push(PushedMessage {
            user_id,
            connection_id,
            event: event.to_string(),
            payload: payload.clone(),
        });
        true
    }
}

impl std::fmt::Debug for RecordingPushChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingPushChannel")
            .field("sent_count", &self.sent.lock().len())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
