use chrono::{DateTime, Utc};

/// Something that happened to an aggregate, published after the write commits.
///
/// Realtime subscribers receive `event_type()` as the SSE event name, so keep it stable
/// (`expo.booth.reserved`, not a Rust type name).
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn event_type(&self) -> &'static str;

    /// Business time, taken from the command that caused the event.
    fn occurred_at(&self) -> DateTime<Utc>;
}
