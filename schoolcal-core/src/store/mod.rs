//! Event storage.
//!
//! `EventStore` is the only way the server touches persisted events. Two
//! adapters implement it:
//! - `JsonFileStore`: a single JSON document on disk
//! - `SqliteStore`: `events` and `history` tables via sqlx
//!
//! Both append a history revision for every mutation in the same write.

mod json;
mod sqlite;

#[cfg(test)]
mod contract;

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageTarget;
use crate::error::CalendarResult;
use crate::event::{Event, EventId};
use crate::filter::EventFilter;
use crate::history::EventHistory;
use crate::input::EventDraft;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events matching `filter`, ordered per `filter.sort`.
    async fn list(&self, filter: &EventFilter) -> CalendarResult<Vec<Event>>;

    async fn get(&self, id: EventId) -> CalendarResult<Option<Event>>;

    /// Store a new event under the next id.
    async fn create(&self, draft: &EventDraft) -> CalendarResult<Event>;

    /// Replace all fields of an event. Fails with `EventNotFound` for unknown ids.
    async fn update(&self, id: EventId, draft: &EventDraft) -> CalendarResult<Event>;

    /// Remove an event, returning it. Fails with `EventNotFound` for unknown ids.
    async fn delete(&self, id: EventId) -> CalendarResult<Event>;

    /// Remove every event and revision, and restart ids at `FIRST_EVENT_ID`.
    /// History is otherwise append-only; it is dropped here because ids are reused after a clear.
    async fn clear(&self) -> CalendarResult<()>;

    /// Revision history, ordered by event id.
    async fn history(&self) -> CalendarResult<Vec<EventHistory>>;
}

/// Open the store described by `target`.
pub async fn open(target: &StorageTarget) -> CalendarResult<Arc<dyn EventStore>> {
    match target {
        StorageTarget::Sqlite { url } => {
            let store = SqliteStore::connect(url).await?;
            store.init_schema().await?;
            tracing::info!(url = %url, "opened sqlite event store");
            Ok(Arc::new(store))
        }
        StorageTarget::Json { path } => {
            let store = JsonFileStore::new(path.clone());
            tracing::info!(path = %store.path().display(), "opened json event store");
            Ok(Arc::new(store))
        }
    }
}
