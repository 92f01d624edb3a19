use serde::{Deserialize, Serialize};

use eventsphere_core::ExpoId;

use crate::Feedback;
use crate::feedback::MAX_RATING;

/// Per-expo rating aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub expo_id: ExpoId,
    pub count: usize,
    /// `None` when there is no feedback yet.
    pub average_rating: Option<f64>,
    /// Count per rating; index 0 is a rating of 1.
    pub distribution: [usize; MAX_RATING as usize],
}

pub fn summarize<'a>(expo_id: ExpoId, feedback: impl IntoIterator<Item = &'a Feedback>) -> FeedbackSummary {
    let mut distribution = [0usize; MAX_RATING as usize];
    let mut count = 0usize;
    let mut total = 0u64;

    for fb in feedback.into_iter().filter(|f| f.expo_id == expo_id) {
        count += 1;
        total += u64::from(fb.rating);
        if let Some(slot) = distribution.get_mut(usize::from(fb.rating).saturating_sub(1)) {
            *slot += 1;
        }
    }

    FeedbackSummary {
        expo_id,
        count,
        average_rating: (count > 0).then(|| total as f64 / count as f64),
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use eventsphere_core::UserId;

    use super::*;
    use crate::NewFeedback;

    fn fb(expo_id: ExpoId, rating: i64) -> Feedback {
        Feedback::create(
            NewFeedback {
                user_id: UserId::new(),
                expo_id,
                rating,
                comment: String::new(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn summary_ignores_other_expos() {
        let expo = ExpoId::new();
        let items = vec![fb(expo, 5), fb(expo, 3), fb(ExpoId::new(), 1)];

        let summary = summarize(expo, &items);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average_rating, Some(4.0));
        assert_eq!(summary.distribution, [0, 0, 1, 0, 1]);
    }

    #[test]
    fn empty_summary_has_no_average() {
        let summary = summarize(ExpoId::new(), &Vec::<Feedback>::new());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_rating, None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn average_stays_within_rating_bounds(ratings in proptest::collection::vec(1i64..=5, 1..50)) {
                let expo = ExpoId::new();
                let items: Vec<Feedback> = ratings.iter().map(|r| fb(expo, *r)).collect();
                let summary = summarize(expo, &items);

                let avg = summary.average_rating.unwrap();
                prop_assert!((1.0..=5.0).contains(&avg));
                prop_assert_eq!(summary.distribution.iter().sum::<usize>(), ratings.len());
            }
        }
    }
}
