//! `eventsphere-chat`: two-party conversations with append-only messages.

pub mod chat;

pub use chat::{Chat, Message};
