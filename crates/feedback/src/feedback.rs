use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_core::{DomainError, DomainResult, Entity, ExpoId, FeedbackId, UserId};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: FeedbackId,
    pub user_id: UserId,
    pub expo_id: ExpoId,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub user_id: UserId,
    pub expo_id: ExpoId,
    /// Raw client value; validated into `MIN_RATING..=MAX_RATING`.
    pub rating: i64,
    pub comment: String,
}

impl Feedback {
    pub fn create(input: NewFeedback, now: DateTime<Utc>) -> DomainResult<Self> {
        let rating = u8::try_from(input.rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "rating must be between {MIN_RATING} and {MAX_RATING}"
                ))
            })?;

        Ok(Self {
            id: FeedbackId::new(),
            user_id: input.user_id,
            expo_id: input.expo_id,
            rating,
            comment: input.comment.trim().to_string(),
            created_at: now,
        })
    }

    /// Same user, same expo.
    pub fn duplicates(&self, user_id: UserId, expo_id: ExpoId) -> bool {
        self.user_id == user_id && self.expo_id == expo_id
    }
}

impl Entity for Feedback {
    type Id = FeedbackId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(rating: i64) -> NewFeedback {
        NewFeedback {
            user_id: UserId::new(),
            expo_id: ExpoId::new(),
            rating,
            comment: " great booths ".into(),
        }
    }

    #[test]
    fn rating_bounds() {
        for ok in 1..=5 {
            assert!(Feedback::create(input(ok), Utc::now()).is_ok());
        }
        for bad in [0, 6, -1, 300] {
            assert!(matches!(
                Feedback::create(input(bad), Utc::now()),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn comment_is_trimmed() {
        let fb = Feedback::create(input(4), Utc::now()).unwrap();
        assert_eq!(fb.comment, "great booths");
    }
}
