use core::fmt::Display;
use core::str::FromStr;

use eventsphere_auth::{CommandAuthorization, Permission};
use eventsphere_core::{DomainError, Entity};
use eventsphere_infra::Versioned;

use crate::app::errors::ApiError;
use crate::app::services::Store;

/// Small helper wrapper to associate required permissions with a command.
pub struct CmdAuth<C> {
    pub inner: C,
    pub required: Vec<Permission>,
}

impl<C> CommandAuthorization for CmdAuth<C> {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}

/// Parse a path segment into a typed id (400 on garbage).
pub fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(ApiError::from)
}

/// Load a document or fail with 404 naming what was missing.
pub async fn fetch<K, V>(store: &Store<K, V>, id: &K, what: &str) -> Result<Versioned<V>, ApiError>
where
    K: Display + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{what} {id} not found")))
}

/// Insert a new entity keyed by its own id.
pub async fn create<V>(store: &Store<V::Id, V>, value: V) -> Result<Versioned<V>, ApiError>
where
    V: Entity + Send + Sync + 'static,
    V::Id: Send + Sync + 'static,
{
    let id = value.id().clone();
    Ok(store.insert(id, value).await?)
}

pub async fn list_values<K, V>(store: &Store<K, V>) -> Result<Vec<V>, ApiError>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    Ok(store.list().await?.into_iter().map(Versioned::into_value).collect())
}
