//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the Ajir
//! workflow. Each identifier is a distinct type — you cannot pass a
//! [`MilestoneId`] where a [`ContractId`] is expected, so cross-namespace
//! mixups are rejected at compile time.
//!
//! All identifiers are UUID-backed and valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Implements the shared surface of a UUID-backed identifier newtype:
/// random construction, UUID conversion, `Default`, `Display`, `FromStr`.
macro_rules! uuid_identifier {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_identifier! {
    /// A registered marketplace account: client, freelancer, or platform
    /// administrator.
    UserId
}

uuid_identifier! {
    /// The project (job posting) a contract originates from.
    ProjectId
}

uuid_identifier! {
    /// A contract between a client and a freelancer.
    ContractId
}

uuid_identifier! {
    /// A single payment milestone within a contract.
    MilestoneId
}

uuid_identifier! {
    /// A dispute proceeding over one contract.
    DisputeId
}

uuid_identifier! {
    /// A persisted notification record.
    NotificationId
}

uuid_identifier! {
    /// An active real-time connection. Advisory only — the connection
    /// registry is never a source of truth.
    ConnectionId
}
