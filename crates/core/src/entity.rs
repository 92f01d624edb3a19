//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Document stores key records by `id()`, so every persisted type implements this.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
