use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_core::{Entity, ExpoId, RegistrationId, SessionId, UserId};

/// An attendee's registration for an expo, optionally naming sessions.
///
/// The same user may register for the same expo more than once; uniqueness is a
/// deployment switch enforced by the caller via [`Registration::duplicates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: RegistrationId,
    pub user_id: UserId,
    pub expo_id: ExpoId,
    #[serde(default)]
    pub sessions: Vec<SessionId>,
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(user_id: UserId, expo_id: ExpoId, sessions: Vec<SessionId>, now: DateTime<Utc>) -> Self {
        let mut sessions = sessions;
        sessions.sort();
        sessions.dedup();
        Self {
            id: RegistrationId::new(),
            user_id,
            expo_id,
            sessions,
            registered_at: now,
        }
    }

    /// Same user, same expo.
    pub fn duplicates(&self, user_id: UserId, expo_id: ExpoId) -> bool {
        self.user_id == user_id && self.expo_id == expo_id
    }
}

impl Entity for Registration {
    type Id = RegistrationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
