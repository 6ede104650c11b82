//! SQLite EventStore implementation.
//!
//! Grades are kept in a comma-joined TEXT column; dates as `YYYY-MM-DD`
//! TEXT so that string order is date order. Each mutation and its history
//! row are written in one transaction.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::EventStore;
use crate::error::{CalendarError, CalendarResult};
use crate::event::{Event, EventId, EventType, Grades, LocalizedText};
use crate::filter::{EventFilter, EventSort};
use crate::history::{EventHistory, Revision, RevisionAction};
use crate::input::EventDraft;

const CREATE_EVENTS: &str = "\
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start TEXT NOT NULL,
    end_date TEXT NOT NULL,
    title_zh TEXT NOT NULL,
    title_en TEXT NOT NULL DEFAULT '',
    description_zh TEXT NOT NULL DEFAULT '',
    description_en TEXT NOT NULL DEFAULT '',
    type TEXT NOT NULL,
    grade TEXT NOT NULL,
    link TEXT NOT NULL DEFAULT ''
)";

// No foreign key: history outlives deleted events.
const CREATE_HISTORY: &str = "\
CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    action TEXT NOT NULL,
    details TEXT NOT NULL
)";

const EVENT_COLUMNS: &str =
    "id, start, end_date, title_zh, title_en, description_zh, description_en, type, grade, link";

/// SQLite implementation of EventStore.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a store over an existing pool. Call `init_schema` before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `url` (e.g. `sqlite://calendar.db` or `sqlite::memory:`),
    /// creating the database file if missing.
    pub async fn connect(url: &str) -> CalendarResult<Self> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to an in-memory database is a separate database.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(opts)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(opts)
                .await?
        };

        Ok(Self::new(pool))
    }

    pub async fn init_schema(&self) -> CalendarResult<()> {
        sqlx::query(CREATE_EVENTS).execute(&self.pool).await?;
        sqlx::query(CREATE_HISTORY).execute(&self.pool).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_event(conn: &mut SqliteConnection, id: EventId) -> CalendarResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
        row.as_ref().map(event_from_row).transpose()
    }

    async fn insert_revision(
        conn: &mut SqliteConnection,
        event_id: EventId,
        revision: &Revision,
    ) -> CalendarResult<()> {
        sqlx::query("INSERT INTO history (event_id, date, action, details) VALUES (?1, ?2, ?3, ?4)")
            .bind(event_id)
            .bind(revision.date)
            .bind(revision.action.as_str())
            .bind(&revision.details)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn list(&self, filter: &EventFilter) -> CalendarResult<Vec<Event>> {
        // Type and date range are pushed down; keyword and grade matching
        // need Unicode-aware comparisons and run in `filter.apply`.
        let order = match filter.sort {
            EventSort::Insertion => "id",
            EventSort::StartDate => "start, id",
        };
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE (?1 IS NULL OR type = ?1) \
             AND (?2 IS NULL OR end_date >= ?2) \
             AND (?3 IS NULL OR start <= ?3) \
             ORDER BY {order}"
        );

        let rows = sqlx::query(&sql)
            .bind(filter.kind.map(|k| k.as_str()))
            .bind(filter.range.from)
            .bind(filter.range.to)
            .fetch_all(&self.pool)
            .await?;

        let events = rows
            .iter()
            .map(event_from_row)
            .collect::<CalendarResult<Vec<_>>>()?;
        Ok(filter.apply(events))
    }

    async fn get(&self, id: EventId) -> CalendarResult<Option<Event>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_event(&mut *conn, id).await
    }

    async fn create(&self, draft: &EventDraft) -> CalendarResult<Event> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO events (start, end_date, title_zh, title_en, description_zh, description_en, type, grade, link) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(draft.start)
        .bind(draft.end)
        .bind(&draft.title.zh)
        .bind(&draft.title.en)
        .bind(&draft.description.zh)
        .bind(&draft.description.en)
        .bind(draft.kind.as_str())
        .bind(draft.grade.to_joined())
        .bind(&draft.link)
        .execute(&mut *tx)
        .await?;

        let event = draft.clone().into_event(result.last_insert_rowid());
        Self::insert_revision(&mut *tx, event.id, &Revision::created(&event)).await?;

        tx.commit().await?;
        Ok(event)
    }

    async fn update(&self, id: EventId, draft: &EventDraft) -> CalendarResult<Event> {
        let mut tx = self.pool.begin().await?;

        let before = Self::fetch_event(&mut *tx, id)
            .await?
            .ok_or(CalendarError::EventNotFound(id))?;

        sqlx::query(
            "UPDATE events SET start = ?1, end_date = ?2, title_zh = ?3, title_en = ?4, \
             description_zh = ?5, description_en = ?6, type = ?7, grade = ?8, link = ?9 \
             WHERE id = ?10",
        )
        .bind(draft.start)
        .bind(draft.end)
        .bind(&draft.title.zh)
        .bind(&draft.title.en)
        .bind(&draft.description.zh)
        .bind(&draft.description.en)
        .bind(draft.kind.as_str())
        .bind(draft.grade.to_joined())
        .bind(&draft.link)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let after = draft.clone().into_event(id);
        Self::insert_revision(&mut *tx, id, &Revision::updated(&before, &after)).await?;

        tx.commit().await?;
        Ok(after)
    }

    async fn delete(&self, id: EventId) -> CalendarResult<Event> {
        let mut tx = self.pool.begin().await?;

        let removed = Self::fetch_event(&mut *tx, id)
            .await?
            .ok_or(CalendarError::EventNotFound(id))?;

        sqlx::query("DELETE FROM events WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_revision(&mut *tx, id, &Revision::deleted(&removed)).await?;

        tx.commit().await?;
        Ok(removed)
    }

    async fn clear(&self) -> CalendarResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM events").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM history").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name IN ('events', 'history')")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn history(&self) -> CalendarResult<Vec<EventHistory>> {
        let rows = sqlx::query("SELECT event_id, date, action, details FROM history ORDER BY event_id, id")
            .fetch_all(&self.pool)
            .await?;

        let mut histories: Vec<EventHistory> = Vec::new();
        for row in rows {
            let event_id: EventId = row.try_get("event_id")?;
            let date: DateTime<Utc> = row.try_get("date")?;
            let action: String = row.try_get("action")?;
            let revision = Revision {
                date,
                action: RevisionAction::from_str(&action)?,
                details: row.try_get("details")?,
            };
            EventHistory::append(&mut histories, event_id, revision);
        }

        Ok(histories)
    }
}

fn event_from_row(row: &SqliteRow) -> CalendarResult<Event> {
    let start: NaiveDate = row.try_get("start")?;
    let end: NaiveDate = row.try_get("end_date")?;
    let kind: String = row.try_get("type")?;
    let grade: String = row.try_get("grade")?;

    Ok(Event {
        id: row.try_get("id")?,
        start,
        end,
        title: LocalizedText::new(
            row.try_get::<String, _>("title_zh")?,
            row.try_get::<String, _>("title_en")?,
        ),
        description: LocalizedText::new(
            row.try_get::<String, _>("description_zh")?,
            row.try_get::<String, _>("description_en")?,
        ),
        kind: EventType::from_str(&kind)?,
        grade: Grades::parse_joined(&grade)?,
        link: row.try_get("link")?,
    })
}
