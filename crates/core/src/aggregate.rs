//! Aggregates: stored documents whose every change goes through a command.
//!
//! The floor plan is the main one. Reservations race, so its writes are conditional on the
//! version that was read.

/// Identity and version of an aggregate snapshot.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied so far. Starts at 0 for a fresh aggregate.
    fn version(&self) -> u64;
}

/// What a conditional write expects to find in the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Last write wins.
    Any,
    /// Write only if the stored document is still at this version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

/// Command/event split for aggregates.
///
/// `handle` looks at the current state and either rejects the command or returns the
/// events it produces; `apply` folds one event into the state. Neither does IO.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Bumps `version()` by one.
    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_every_version() {
        assert!(ExpectedVersion::Any.matches(0));
        assert!(ExpectedVersion::Any.matches(42));
    }

    #[test]
    fn exact_matches_only_its_version() {
        assert!(ExpectedVersion::Exact(4).matches(4));
        assert!(!ExpectedVersion::Exact(3).matches(4));
    }
}
