//! # Notification Persistence Seam
//!
//! Insert-only append of notification records plus recipient-scoped
//! reads. The durable implementation lives with the persistence
//! collaborator; [`InMemoryNotificationStore`] is the reference
//! implementation used in embedding and tests.

use dashmap::DashMap;
use thiserror::Error;

use ajir_core::{NotificationId, UserId};

use crate::notification::Notification;

/// Error appending or updating a notification record.
///
/// Deliberately small: the sink swallows these, so the only consumer is
/// a log line.
#[derive(Error, Debug)]
pub enum NotificationStoreError {
    /// The backing store could not be reached or refused the write.
    #[error("notification store unavailable: {0}")]
    Unavailable(String),
}

/// Insert-only notification persistence with recipient-scoped reads.
pub trait NotificationStore: Send + Sync {
    /// Append a notification record.
    fn append(&self, notification: Notification) -> Result<(), NotificationStoreError>;

    /// All notifications for a recipient, oldest first.
    fn all_for(&self, recipient_id: UserId) -> Vec<Notification>;

    /// Unread notifications for a recipient, oldest first.
    fn unread_for(&self, recipient_id: UserId) -> Vec<Notification> {
        self.all_for(recipient_id)
            .into_iter()
            .filter(|n| !n.is_read)
            .collect()
    }

    /// Mark one of the recipient's notifications as read. Returns whether
    /// a record was updated; a notification id belonging to a different
    /// recipient is simply not found.
    fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient_id: UserId,
    ) -> Result<bool, NotificationStoreError>;

    /// Mark all of the recipient's notifications as read, returning how
    /// many were flipped.
    fn mark_all_read(&self, recipient_id: UserId) -> Result<usize, NotificationStoreError>;
}

/// In-memory notification store keyed by recipient.
#[derive(Default)]
pub struct InMemoryNotificationStore {
    by_recipient: DashMap<UserId, Vec<Notification>>,
}

impl InMemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            by_recipient: DashMap::new(),
        }
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn append(&self, notification: Notification) -> Result<(), NotificationStoreError> {
        self.by_recipient
            .entry(notification.recipient_id)
            .or_default()
            .push(notification);
        Ok(())
    }

    fn all_for(&self, recipient_id: UserId) -> Vec<Notification> {
        self.by_recipient
            .get(&recipient_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient_id: UserId,
    ) -> Result<bool, NotificationStoreError> {
        let Some(mut entry) = self.by_recipient.get_mut(&recipient_id) else {
            return Ok(false);
        };
        match entry
            .value_mut()
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            Some(n) => {
                n.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn mark_all_read(&self, recipient_id: UserId) -> Result<usize, NotificationStoreError> {
        let Some(mut entry) = self.by_recipient.get_mut(&recipient_id) else {
            return Ok(0);
        };
        let mut flipped = 0;
        for n in entry.value_mut().iter_mut().filter(|n| !n.is_read) {
            n.is_read = true;
            flipped += 1;
        }
        Ok(flipped)
    }
}

impl std::fmt::Debug for InMemoryNotificationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryNotificationStore")
            .field("recipient_count", &self.by_recipient.len())
            .finish()
    }
}

/// A store that refuses every write. Exists to exercise the sink's
/// swallow-and-log path in tests.
#[derive(Debug, Default)]
pub struct FailingNotificationStore;

impl NotificationStore for FailingNotificationStore {
    fn append(&self, _notification: Notification) -> Result<(), NotificationStoreError> {
        Err(NotificationStoreError::Unavailable(
            "simulated outage".to_string(),
        ))
    }

    fn all_for(&self, _recipient_id: UserId) -> Vec<Notification> {
        Vec::new()
    }

    fn mark_read(
        &self,
        _notification_id: NotificationId,
        _recipient_id: UserId,
    ) -> Result<bool, NotificationStoreError> {
        Err(NotificationStoreError::Unavailable(
            "simulated outage".to_string(),
        ))
    }

    fn mark_all_read(&self, _recipient_id: UserId) -> Result<usize, NotificationStoreError> {
        Err(NotificationStoreError::Unavailable(
            "simulated outage".to_string(),
        ))
    }
}
