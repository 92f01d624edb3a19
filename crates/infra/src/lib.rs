//! Infrastructure layer: configuration, document stores, command dispatch.

pub mod command_dispatcher;
pub mod config;
pub mod store;

pub use command_dispatcher::{CommandDispatcher, DispatchError, Dispatched, modify_with_retry};
pub use config::{AppConfig, ConfigError};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError, Versioned};

#[cfg(feature = "postgres")]
pub use store::postgres::{PostgresDocumentStore, ensure_schema};
