//! # Actor Identity
//!
//! The authenticated caller of a workflow operation. Credential
//! verification happens upstream; the workflow only checks party
//! membership (is this actor the client/freelancer of the aggregate) and
//! administrator role.

use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// Role of an authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// A regular marketplace account (client or freelancer — which side
    /// of a contract it is on depends on the aggregate, not the role).
    Member,
    /// A platform administrator mediating disputes.
    Admin,
}

/// An already-authenticated caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting account.
    pub user_id: UserId,
    /// The account's role.
    pub role: Role,
}

impl Actor {
    /// A regular member actor.
    pub fn member(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Member,
        }
    }

    /// A platform administrator actor.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    /// Whether this actor holds the administrator role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_is_not_admin() {
        let a = Actor::member(UserId::new());
        assert!(!a.is_admin());
        assert_eq!(a.role, Role::Member);
    }

    #[test]
    fn test_admin_is_admin() {
        assert!(Actor::admin(UserId::new()).is_admin());
    }
}
