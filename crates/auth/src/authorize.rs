use std::collections::HashSet;

use thiserror::Error;

use eventsphere_core::UserId;

use crate::{Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    #[error("forbidden: acting on behalf of another user requires admin")]
    NotOwner,
}

/// Command-side authorization contract (checked before the command runs).
///
/// The API layer enforces these requirements before touching storage.
pub trait CommandAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Authorize a principal for a single permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms: HashSet<&str> = principal.permissions.iter().map(|p| p.as_str()).collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Allow the call when the principal is the subject user or an admin.
pub fn ensure_self_or_admin(principal: &Principal, subject: UserId) -> Result<(), AuthzError> {
    if principal.user_id == subject || principal.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, permissions};

    #[test]
    fn admin_wildcard_grants_everything() {
        let admin = Principal::new(UserId::new(), Role::Admin);
        assert!(authorize(&admin, &Permission::new("expo.create")).is_ok());
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let attendee = Principal::new(UserId::new(), Role::Attendee);
        let err = authorize(&attendee, &permissions::BOOTH_RESERVE).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("expo.booth.reserve".to_string()));
    }

    #[test]
    fn self_or_admin() {
        let me = UserId::new();
        let attendee = Principal::new(me, Role::Attendee);
        assert!(ensure_self_or_admin(&attendee, me).is_ok());
        assert_eq!(
            ensure_self_or_admin(&attendee, UserId::new()),
            Err(AuthzError::NotOwner)
        );

        let admin = Principal::new(UserId::new(), Role::Admin);
        assert!(ensure_self_or_admin(&admin, me).is_ok());
    }
}
