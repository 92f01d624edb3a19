use eventsphere_auth::{Principal, Role};
use eventsphere_core::UserId;

/// Principal context for a request (authenticated identity + role).
///
/// Inserted by the auth middleware; must be present for all protected routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    role: Role,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Policy view of this caller, with the role's permissions resolved.
    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, self.role)
    }
}
