//! `eventsphere-feedback`: attendee ratings and comments per expo.

pub mod feedback;
pub mod summary;

pub use feedback::{Feedback, NewFeedback};
pub use summary::{FeedbackSummary, summarize};
