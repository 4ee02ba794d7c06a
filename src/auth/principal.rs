//! The authenticated principal
//!
//! Authentication happens at the HTTP boundary; the core components only
//! authorize, using this resolved `{id, role}` pair against resource
//! ownership.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account roles, ordered so that `Admin > User`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// An authenticated caller, resolved from a verified token before any core
/// component is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: ObjectId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: ObjectId, role: Role) -> Self {
        Self { id, role }
    }

    /// True when the principal is `owner` or holds admin.
    pub fn owns_or_admin(&self, owner: ObjectId) -> bool {
        self.id == owner || self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin > Role::User);
    }

    #[test]
    fn test_owns_or_admin() {
        let id = ObjectId::new();
        let other = ObjectId::new();

        let user = Principal::new(id, Role::User);
        assert!(user.owns_or_admin(id));
        assert!(!user.owns_or_admin(other));

        let admin = Principal::new(id, Role::Admin);
        assert!(admin.owns_or_admin(other));
    }
}
