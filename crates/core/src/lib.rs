//! `eventsphere-core`: ids, domain errors and the aggregate contract shared by every
//! EventSphere crate. No IO lives here.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod time;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    BoothId, ChatId, ExhibitorApplicationId, ExpoId, FeedbackId, MessageId, RegistrationId,
    SessionId, UserId,
};
