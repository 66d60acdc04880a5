//! # ajir-notify — Notifications & Real-Time Push
//!
//! Side-channel delivery for workflow transitions:
//!
//! - **Notification** ([`notification`]): the persisted record a user
//!   sees in their notification feed, with recipient-only read state.
//!
//! - **Store** ([`store`]): insert-only persistence seam with an
//!   in-memory reference implementation.
//!
//! - **Registry** ([`registry`]): the advisory user → connection map used
//!   to route real-time pushes. Losing it only delays delivery — the
//!   persisted record satisfies eventual delivery on next login.
//!
//! - **Sink** ([`sink`]): the one entry point the workflow calls. A sink
//!   failure is logged and swallowed; it can never fail or roll back the
//!   transition that triggered it.

pub mod notification;
pub mod registry;
pub mod sink;
pub mod store;

// Re-export primary types for ergonomic imports.
pub use notification::{Notification, NotificationDraft};
pub use registry::ConnectionRegistry;
pub use sink::{NotificationSink, PushChannel, PushedMessage, RecordingPushChannel};
pub use store::{
    FailingNotificationStore, InMemoryNotificationStore, NotificationStore, NotificationStoreError,
};
