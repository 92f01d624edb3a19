use serde::{Deserialize, Serialize};

use eventsphere_core::UserId;

use crate::{Permission, Role, permissions::permissions_for};

/// A fully resolved principal for authorization decisions.
///
/// Built from verified token claims; storage is never consulted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self {
            user_id,
            role,
            permissions: permissions_for(role),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
