//! Per-expo schedule: sessions with optional attendee capacity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_core::{DomainError, DomainResult, Entity, ExpoId, SessionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub expo_id: ExpoId,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub speaker: Option<String>,
    pub location: String,
    pub category: String,
    pub max_attendees: Option<u32>,
    #[serde(default)]
    pub registered_attendees: Vec<UserId>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub speaker: Option<String>,
    pub location: String,
    pub category: String,
    pub max_attendees: Option<u32>,
}

impl Session {
    pub fn create(expo_id: ExpoId, input: NewSession) -> DomainResult<Self> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("session title cannot be empty"));
        }
        if input.end_time <= input.start_time {
            return Err(DomainError::validation("endTime must be after startTime"));
        }
        if input.max_attendees == Some(0) {
            return Err(DomainError::validation("maxAttendees must be greater than zero"));
        }

        Ok(Self {
            id: SessionId::new(),
            expo_id,
            title: title.to_string(),
            description: input.description,
            start_time: input.start_time,
            end_time: input.end_time,
            speaker: input.speaker.filter(|s| !s.trim().is_empty()),
            location: input.location,
            category: input.category,
            max_attendees: input.max_attendees,
            registered_attendees: Vec::new(),
        })
    }

    /// Add `user_id` to the attendee list.
    ///
    /// Returns `Ok(false)` when the user was already registered (no change).
    pub fn register_attendee(&mut self, user_id: UserId) -> DomainResult<bool> {
        if self.registered_attendees.contains(&user_id) {
            return Ok(false);
        }
        if let Some(max) = self.max_attendees {
            if self.registered_attendees.len() >= max as usize {
                return Err(DomainError::invariant(format!(
                    "session '{}' is full ({max} attendees)",
                    self.title
                )));
            }
        }
        self.registered_attendees.push(user_id);
        Ok(true)
    }

    pub fn seats_left(&self) -> Option<u32> {
        self.max_attendees
            .map(|max| max.saturating_sub(self.registered_attendees.len() as u32))
    }
}

impl Entity for Session {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn new_session(max_attendees: Option<u32>) -> NewSession {
        let start = Utc::now() + Duration::days(3);
        NewSession {
            title: "Keynote".into(),
            description: "Opening".into(),
            start_time: start,
            end_time: start + Duration::hours(1),
            speaker: Some("Dr. Grace".into()),
            location: "Main stage".into(),
            category: "keynote".into(),
            max_attendees,
        }
    }

    #[test]
    fn end_must_follow_start() {
        let mut input = new_session(None);
        input.end_time = input.start_time;
        assert!(matches!(
            Session::create(ExpoId::new(), input),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn registration_is_idempotent_and_capped() {
        let mut session = Session::create(ExpoId::new(), new_session(Some(1))).unwrap();
        let user = UserId::new();

        assert!(session.register_attendee(user).unwrap());
        assert!(!session.register_attendee(user).unwrap());
        assert_eq!(session.seats_left(), Some(0));

        let err = session.register_attendee(UserId::new()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(session.registered_attendees, vec![user]);
    }

    #[test]
    fn uncapped_sessions_accept_everyone() {
        let mut session = Session::create(ExpoId::new(), new_session(None)).unwrap();
        for _ in 0..25 {
            session.register_attendee(UserId::new()).unwrap();
        }
        assert_eq!(session.seats_left(), None);
    }
}
