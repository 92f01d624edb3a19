//! API-side authorization guard for commands.
//!
//! This enforces authorization at the command boundary (before any store is touched),
//! while keeping domain crates and infra auth-agnostic.

use eventsphere_auth::{AuthzError, CommandAuthorization, authorize};
use eventsphere_core::UserId;

use crate::context::PrincipalContext;

/// Check authorization for a command in the current request context.
pub fn authorize_command<C: CommandAuthorization>(
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    let principal = principal.principal();
    for perm in command.required_permissions() {
        authorize(&principal, perm)?;
    }
    Ok(())
}

pub fn require_admin(principal: &PrincipalContext) -> Result<(), AuthzError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden("admin".to_string()))
    }
}

/// The caller acts on their own behalf, or is an admin acting for `subject`.
pub fn ensure_self_or_admin(principal: &PrincipalContext, subject: UserId) -> Result<(), AuthzError> {
    eventsphere_auth::ensure_self_or_admin(&principal.principal(), subject)
}
