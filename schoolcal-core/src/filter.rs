//! Event list filtering.

use serde::Deserialize;

use crate::date_range::DateRange;
use crate::error::CalendarResult;
use crate::event::{Event, EventType};
use crate::input::non_blank;

/// Filter parameters as they arrive in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub grade: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventSort {
    /// Order in which events were created
    #[default]
    Insertion,
    /// Start date ascending, ties by id
    StartDate,
}

/// A parsed event filter. The default filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Lowercased keyword
    pub search: Option<String>,
    pub kind: Option<EventType>,
    pub grade: Option<String>,
    pub range: DateRange,
    pub sort: EventSort,
}

impl EventFilter {
    pub fn all() -> Self {
        EventFilter::default()
    }

    pub fn from_query(query: &EventQuery) -> CalendarResult<Self> {
        let kind = match non_blank(query.kind.as_deref()) {
            Some(kind) => Some(kind.parse()?),
            None => None,
        };

        Ok(EventFilter {
            search: non_blank(query.search.as_deref()).map(str::to_lowercase),
            kind,
            grade: non_blank(query.grade.as_deref()).map(str::to_string),
            range: DateRange::from_args(query.start.as_deref(), query.end.as_deref())?,
            sort: EventSort::Insertion,
        })
    }

    pub fn sorted_by(mut self, sort: EventSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        if let Some(kind) = self.kind
            && event.kind != kind
        {
            return false;
        }

        if let Some(grade) = &self.grade
            && !event.grade.matches_label(grade)
        {
            return false;
        }

        if !self.range.is_unbounded() && !event.overlaps(self.range.from, self.range.to) {
            return false;
        }

        match &self.search {
            Some(keyword) => [
                &event.title.zh,
                &event.title.en,
                &event.description.zh,
                &event.description.en,
            ]
            .iter()
            .any(|text| text.to_lowercase().contains(keyword)),
            None => true,
        }
    }

    /// Keep matching events and order them per `sort`.
    /// Input is expected in insertion order.
    pub fn apply(&self, events: impl IntoIterator<Item = Event>) -> Vec<Event> {
        let mut events: Vec<Event> = events.into_iter().filter(|e| self.matches(e)).collect();
        if self.sort == EventSort::StartDate {
            events.sort_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)));
        }
        events
    }
}
