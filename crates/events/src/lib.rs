//! Domain events emitted by aggregates and fanned out to realtime subscribers.

pub mod envelope;
pub mod event;

pub use envelope::EventEnvelope;
pub use event::Event;
