use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_core::{DomainError, DomainResult, Entity, ExpoId, UserId};

/// Expo lifecycle. Only moves forward: upcoming → active → completed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpoStatus {
    #[default]
    Upcoming,
    Active,
    Completed,
}

impl ExpoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpoStatus::Upcoming => "upcoming",
            ExpoStatus::Active => "active",
            ExpoStatus::Completed => "completed",
        }
    }

    /// Staying put is allowed; going back is not.
    pub fn can_transition_to(self, next: ExpoStatus) -> bool {
        next >= self
    }
}

impl core::fmt::Display for ExpoStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expo {
    pub id: ExpoId,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub theme: String,
    pub max_exhibitors: u32,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub status: ExpoStatus,
    pub organizer_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExpo {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    /// Defaults to `start_date` (single-day expo).
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub theme: String,
    pub max_exhibitors: u32,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub status: Option<ExpoStatus>,
    pub organizer_id: Option<UserId>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ExpoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub theme: Option<String>,
    pub max_exhibitors: Option<u32>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub status: Option<ExpoStatus>,
    pub organizer_id: Option<UserId>,
}

impl Expo {
    pub fn create(input: NewExpo, now: DateTime<Utc>) -> DomainResult<Self> {
        let expo = Self {
            id: ExpoId::new(),
            title: input.title.trim().to_string(),
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date.unwrap_or(input.start_date),
            location: input.location,
            theme: input.theme,
            max_exhibitors: input.max_exhibitors,
            registration_deadline: input.registration_deadline,
            status: input.status.unwrap_or_default(),
            organizer_id: input.organizer_id,
            created_at: now,
            updated_at: now,
        };
        expo.validate()?;
        Ok(expo)
    }

    /// Apply a partial update. The patched expo is validated as a whole and the
    /// original is left untouched on error.
    pub fn apply_patch(&mut self, patch: ExpoPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut next = self.clone();

        if let Some(status) = patch.status {
            if !self.status.can_transition_to(status) {
                return Err(DomainError::invariant(format!(
                    "expo status cannot move from {} back to {}",
                    self.status, status
                )));
            }
            next.status = status;
        }
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if let Some(end) = patch.end_date {
            next.end_date = end;
        }
        if let Some(location) = patch.location {
            next.location = location;
        }
        if let Some(theme) = patch.theme {
            next.theme = theme;
        }
        if let Some(max) = patch.max_exhibitors {
            next.max_exhibitors = max;
        }
        if let Some(deadline) = patch.registration_deadline {
            next.registration_deadline = Some(deadline);
        }
        if let Some(organizer) = patch.organizer_id {
            next.organizer_id = Some(organizer);
        }

        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Exhibitor applications are accepted until the deadline (inclusive).
    pub fn accepts_applications_at(&self, at: DateTime<Utc>) -> bool {
        match self.registration_deadline {
            Some(deadline) => at <= deadline,
            None => true,
        }
    }

    pub fn is_upcoming(&self) -> bool {
        self.status == ExpoStatus::Upcoming
    }

    fn validate(&self) -> DomainResult<()> {
        if self.title.is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if self.end_date < self.start_date {
            return Err(DomainError::validation("endDate must not be before startDate"));
        }
        if self.max_exhibitors == 0 {
            return Err(DomainError::validation("maxExhibitors must be greater than zero"));
        }
        Ok(())
    }
}

impl Entity for Expo {
    type Id = ExpoId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn new_expo() -> NewExpo {
        let start = Utc::now() + Duration::days(30);
        NewExpo {
            title: " HealthTech 2025 ".to_string(),
            description: "Medical devices".to_string(),
            start_date: start,
            end_date: Some(start + Duration::days(2)),
            location: "Hall 4".to_string(),
            theme: "health".to_string(),
            max_exhibitors: 2,
            registration_deadline: Some(start - Duration::days(7)),
            status: None,
            organizer_id: None,
        }
    }

    #[test]
    fn create_trims_title_and_defaults_status() {
        let expo = Expo::create(new_expo(), Utc::now()).unwrap();
        assert_eq!(expo.title, "HealthTech 2025");
        assert_eq!(expo.status, ExpoStatus::Upcoming);
    }

    #[test]
    fn missing_end_date_means_single_day() {
        let input = NewExpo { end_date: None, ..new_expo() };
        let expo = Expo::create(input, Utc::now()).unwrap();
        assert_eq!(expo.start_date, expo.end_date);
    }

    #[test]
    fn create_validates() {
        let blank = NewExpo { title: "  ".into(), ..new_expo() };
        assert!(matches!(Expo::create(blank, Utc::now()), Err(DomainError::Validation(_))));

        let input = new_expo();
        let backwards = NewExpo {
            end_date: Some(input.start_date - Duration::days(1)),
            ..input
        };
        assert!(matches!(Expo::create(backwards, Utc::now()), Err(DomainError::Validation(_))));

        let no_room = NewExpo { max_exhibitors: 0, ..new_expo() };
        assert!(matches!(Expo::create(no_room, Utc::now()), Err(DomainError::Validation(_))));
    }

    #[test]
    fn status_only_moves_forward() {
        let mut expo = Expo::create(new_expo(), Utc::now()).unwrap();

        let to_completed = ExpoPatch { status: Some(ExpoStatus::Completed), ..Default::default() };
        expo.apply_patch(to_completed, Utc::now()).unwrap();

        let back = ExpoPatch { status: Some(ExpoStatus::Active), ..Default::default() };
        let err = expo.apply_patch(back, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(expo.status, ExpoStatus::Completed);
    }

    #[test]
    fn failed_patch_leaves_expo_untouched() {
        let mut expo = Expo::create(new_expo(), Utc::now()).unwrap();
        let before = expo.clone();

        let patch = ExpoPatch {
            title: Some("Renamed".into()),
            max_exhibitors: Some(0),
            ..Default::default()
        };
        assert!(expo.apply_patch(patch, Utc::now()).is_err());
        assert_eq!(expo, before);
    }

    #[test]
    fn deadline_is_inclusive() {
        let expo = Expo::create(new_expo(), Utc::now()).unwrap();
        let deadline = expo.registration_deadline.unwrap();
        assert!(expo.accepts_applications_at(deadline));
        assert!(!expo.accepts_applications_at(deadline + Duration::seconds(1)));
    }

    #[test]
    fn serializes_camel_case_status() {
        let expo = Expo::create(new_expo(), Utc::now()).unwrap();
        let json = serde_json::to_value(&expo).unwrap();
        assert_eq!(json["status"], "upcoming");
        assert_eq!(json["maxExhibitors"], 2);
    }
}
