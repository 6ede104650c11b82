//! Events stored as one JSON document on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::EventStore;
use crate::error::{CalendarError, CalendarResult};
use crate::event::{Event, EventId, FIRST_EVENT_ID};
use crate::filter::EventFilter;
use crate::history::{EventHistory, Revision};
use crate::input::EventDraft;

fn first_event_id() -> EventId {
    FIRST_EVENT_ID
}

/// On-disk layout. Grades are kept as native arrays.
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(default = "first_event_id")]
    next_id: EventId,
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    history: Vec<EventHistory>,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            next_id: FIRST_EVENT_ID,
            events: Vec::new(),
            history: Vec::new(),
        }
    }
}

/// JSON file backed store.
///
/// The file is re-read on every operation so that edits made while the
/// server runs are picked up. Mutations hold `lock` for the whole
/// read-modify-write cycle and replace the file atomically.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> CalendarResult<Document> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Document::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, doc: &Document) -> CalendarResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Run `f` against the current document and persist the result.
    async fn modify<T>(
        &self,
        f: impl FnOnce(&mut Document) -> CalendarResult<T>,
    ) -> CalendarResult<T> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        let result = f(&mut doc)?;
        self.write(&doc).await?;
        Ok(result)
    }
}

#[async_trait]
impl EventStore for JsonFileStore {
    async fn list(&self, filter: &EventFilter) -> CalendarResult<Vec<Event>> {
        let doc = self.read().await?;
        Ok(filter.apply(doc.events))
    }

    async fn get(&self, id: EventId) -> CalendarResult<Option<Event>> {
        let doc = self.read().await?;
        Ok(doc.events.into_iter().find(|e| e.id == id))
    }

    async fn create(&self, draft: &EventDraft) -> CalendarResult<Event> {
        self.modify(|doc| {
            let event = draft.clone().into_event(doc.next_id);
            doc.next_id += 1;
            EventHistory::append(&mut doc.history, event.id, Revision::created(&event));
            doc.events.push(event.clone());
            Ok(event)
        })
        .await
    }

    async fn update(&self, id: EventId, draft: &EventDraft) -> CalendarResult<Event> {
        self.modify(|doc| {
            let slot = doc
                .events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(CalendarError::EventNotFound(id))?;
            let updated = draft.clone().into_event(id);
            let revision = Revision::updated(slot, &updated);
            *slot = updated.clone();
            EventHistory::append(&mut doc.history, id, revision);
            Ok(updated)
        })
        .await
    }

    async fn delete(&self, id: EventId) -> CalendarResult<Event> {
        self.modify(|doc| {
            let index = doc
                .events
                .iter()
                .position(|e| e.id == id)
                .ok_or(CalendarError::EventNotFound(id))?;
            let removed = doc.events.remove(index);
            EventHistory::append(&mut doc.history, id, Revision::deleted(&removed));
            Ok(removed)
        })
        .await
    }

    async fn clear(&self) -> CalendarResult<()> {
        self.modify(|doc| {
            *doc = Document::default();
            Ok(())
        })
        .await
    }

    async fn history(&self) -> CalendarResult<Vec<EventHistory>> {
        let mut history = self.read().await?.history;
        history.sort_by_key(|h| h.event_id);
        Ok(history)
    }
}
