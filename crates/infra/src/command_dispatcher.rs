//! Command execution pipeline for snapshot-persisted aggregates.
//!
//! ```text
//! Command
//!   ↓
//! 1. Load snapshot + version from the document store (or start from `make_aggregate`)
//!   ↓
//! 2. Handle command (pure decision logic, produces events)
//!   ↓
//! 3. Apply events to the snapshot
//!   ↓
//! 4. Write back with ExpectedVersion::Exact(loaded) (insert when new)
//!   ↓
//! 5. Return the new snapshot and the committed events as envelopes
//! ```
//!
//! A concurrent writer that committed in between makes step 4 fail with
//! `StoreError::Concurrency`; the dispatcher never retries, so the caller sees a conflict.

use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use eventsphere_core::{Aggregate, DomainError, ExpectedVersion};
use eventsphere_events::{Event, EventEnvelope};

use crate::store::{DocumentStore, StoreError, Versioned};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Decision rejected by the aggregate.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Loading or persisting the snapshot failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failed to serialize committed events into envelopes.
    #[error("event serialization failed: {0}")]
    Serialize(String),
}

impl DispatchError {
    pub fn is_concurrency(&self) -> bool {
        matches!(self, DispatchError::Store(StoreError::Concurrency(_)))
    }
}

/// Result of a successful dispatch.
#[derive(Debug, Clone)]
pub struct Dispatched<A> {
    pub aggregate: A,
    /// Store version after the write.
    pub version: u64,
    pub events: Vec<EventEnvelope<JsonValue>>,
}

/// Reusable command execution engine over a [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct CommandDispatcher<S> {
    store: S,
}

impl<S> CommandDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Dispatch a command against the aggregate stored under `id`.
    ///
    /// `make_aggregate` builds the empty aggregate when nothing is stored yet.
    pub async fn dispatch<A>(
        &self,
        id: A::Id,
        aggregate_type: &str,
        command: A::Command,
        make_aggregate: impl FnOnce(&A::Id) -> A,
    ) -> Result<Dispatched<A>, DispatchError>
    where
        S: DocumentStore<A::Id, A>,
        A: Aggregate<Error = DomainError> + Clone + Send + Sync + 'static,
        A::Id: core::fmt::Display + Send + Sync + 'static,
        A::Event: Event + Serialize,
    {
        // 1) Load snapshot
        let loaded = self.store.get(&id).await?;
        let (mut aggregate, expected) = match loaded {
            Some(Versioned { value, version }) => (value, Some(version)),
            None => (make_aggregate(&id), None),
        };

        // 2) Decide events (no mutation)
        let decided = aggregate.handle(&command)?;
        if decided.is_empty() {
            return Ok(Dispatched {
                aggregate,
                version: expected.unwrap_or(0),
                events: Vec::new(),
            });
        }

        // 3) Apply
        for event in &decided {
            aggregate.apply(event);
        }

        // 4) Persist (compare-and-swap on the loaded version)
        let stored = match expected {
            Some(version) => {
                self.store
                    .update(id.clone(), aggregate.clone(), ExpectedVersion::Exact(version))
                    .await?
            }
            None => self
                .store
                .insert(id.clone(), aggregate.clone())
                .await
                .map_err(|e| match e {
                    StoreError::AlreadyExists(msg) => StoreError::Concurrency(msg),
                    other => other,
                })?,
        };

        // 5) Envelopes; sequence numbers follow the aggregate version
        let base = aggregate.version().saturating_sub(decided.len() as u64);
        let events = decided
            .iter()
            .enumerate()
            .map(|(i, ev)| EventEnvelope::from_typed(id.to_string(), aggregate_type, base + i as u64 + 1, ev))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DispatchError::Serialize(e.to_string()))?;

        Ok(Dispatched {
            aggregate: stored.value,
            version: stored.version,
            events,
        })
    }
}

/// Load, mutate and conditionally write a document, retrying on version conflicts.
///
/// Only for mutations that commute (e.g. appending a chat message): `mutate` is re-run
/// against the fresh document on every attempt.
pub async fn modify_with_retry<K, V, T, S, F>(
    store: &S,
    id: &K,
    max_attempts: usize,
    mut mutate: F,
) -> Result<(Versioned<V>, T), DispatchError>
where
    K: Clone + core::fmt::Display + Send + Sync + 'static,
    V: Send + Sync + 'static,
    S: DocumentStore<K, V> + ?Sized,
    F: FnMut(&mut V) -> Result<T, DomainError>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        let Versioned { mut value, version } = store
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let out = mutate(&mut value)?;

        match store.update(id.clone(), value, ExpectedVersion::Exact(version)).await {
            Ok(stored) => return Ok((stored, out)),
            Err(StoreError::Concurrency(msg)) if attempt < max_attempts => {
                tracing::debug!(%id, attempt, %msg, "conflicting write, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
}
