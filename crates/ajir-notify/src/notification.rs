//! # Notification Records
//!
//! A notification is created as a side effect of a workflow transition
//! and belongs to its recipient: the workflow never mutates it after
//! insertion, and only the recipient may flip the read flag.

use serde::{Deserialize, Serialize};

use ajir_core::{NotificationId, Timestamp, UserId};

/// The content of a notification before it is persisted.
///
/// Kind tags are dotted lower-case strings versioned like transition
/// kinds (e.g. `contract.milestone.funded.v1`), so feed consumers can
/// dispatch on them without parsing titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDraft {
    /// Who the notification is for.
    pub recipient_id: UserId,
    /// Machine-readable type tag.
    pub kind: String,
    /// Short headline.
    pub title: String,
    /// Full message body.
    pub body: String,
    /// Optional deep-link into the application.
    pub link: Option<String>,
    /// Optional structured payload (aggregate ids, amounts).
    pub metadata: Option<serde_json::Value>,
}

impl NotificationDraft {
    /// A draft with no link or metadata.
    pub fn new(
        recipient_id: UserId,
        kind: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id,
            kind: kind.into(),
            title: title.into(),
            body: body.into(),
            link: None,
            metadata: None,
        }
    }

    /// Attach a deep-link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Attach structured metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A persisted notification record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Who the notification is for.
    pub recipient_id: UserId,
    /// Machine-readable type tag.
    pub kind: String,
    /// Short headline.
    pub title: String,
    /// Full message body.
    pub body: String,
    /// Optional deep-link into the application.
    pub link: Option<String>,
    /// Optional structured payload.
    pub metadata: Option<serde_json::Value>,
    /// Whether the recipient has read it. Mutated only by the recipient.
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: Timestamp,
}

impl Notification {
    /// Materialize a draft into an unread record.
    pub fn from_draft(draft: NotificationDraft) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_id: draft.recipient_id,
            kind: draft.kind,
            title: draft.title,
            body: draft.body,
            link: draft.link,
            metadata: draft.metadata,
            is_read: false,
            created_at: Timestamp::now(),
        }
    }
}
