use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "expo.create").
/// A special wildcard permission `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn new_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const EXPO_REGISTER: Permission = Permission::new_static("expo.register");
pub const EXHIBITOR_APPLY: Permission = Permission::new_static("expo.exhibitor.apply");
pub const BOOTH_RESERVE: Permission = Permission::new_static("expo.booth.reserve");
pub const BOOTH_RELEASE_OWN: Permission = Permission::new_static("expo.booth.release_own");
pub const SESSION_REGISTER: Permission = Permission::new_static("expo.session.register");
pub const FEEDBACK_CREATE: Permission = Permission::new_static("feedback.create");
pub const CHAT_PARTICIPATE: Permission = Permission::new_static("chat.participate");

/// Static role → permission policy.
///
/// Admin holds the wildcard; everything admin-only (expo management, approvals,
/// occupying booths) is simply absent from the other roles.
pub fn permissions_for(role: Role) -> Vec<Permission> {
    match role {
        Role::Admin => vec![Permission::new_static("*")],
        Role::Exhibitor => vec![
            EXHIBITOR_APPLY,
            BOOTH_RESERVE,
            BOOTH_RELEASE_OWN,
            SESSION_REGISTER,
            FEEDBACK_CREATE,
            CHAT_PARTICIPATE,
        ],
        Role::Attendee => vec![
            EXPO_REGISTER,
            SESSION_REGISTER,
            FEEDBACK_CREATE,
            CHAT_PARTICIPATE,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_has_wildcard() {
        assert!(permissions_for(Role::Admin).iter().any(Permission::is_wildcard));
        assert!(!permissions_for(Role::Exhibitor).iter().any(Permission::is_wildcard));
        assert!(!permissions_for(Role::Attendee).iter().any(Permission::is_wildcard));
    }

    #[test]
    fn attendees_cannot_reserve_booths() {
        assert!(!permissions_for(Role::Attendee).contains(&BOOTH_RESERVE));
        assert!(permissions_for(Role::Exhibitor).contains(&BOOTH_RESERVE));
    }
}
