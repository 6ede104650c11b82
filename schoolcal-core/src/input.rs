//! Raw event fields as submitted by the admin forms, and their validation.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::date_range::parse_date;
use crate::error::{CalendarError, CalendarResult};
use crate::event::{Event, EventId, EventType, Grades, LocalizedText};

/// Unvalidated event fields. Every field is optional so that a missing
/// value can be reported as a validation error rather than a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
    pub start: Option<String>,
    pub end: Option<String>,
    pub title_zh: Option<String>,
    pub title_en: Option<String>,
    pub description_zh: Option<String>,
    pub description_en: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub grade: Vec<String>,
    pub link: Option<String>,
}

/// Validated event fields, ready to be stored under an id.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub kind: EventType,
    pub grade: Grades,
    pub link: String,
}

impl EventInput {
    pub fn validate(self) -> CalendarResult<EventDraft> {
        let start = non_blank(self.start.as_deref()).ok_or(CalendarError::MissingField("start"))?;
        let title_zh =
            non_blank(self.title_zh.as_deref()).ok_or(CalendarError::MissingField("title_zh"))?;

        let start = parse_date("start", start)?;
        let end = match non_blank(self.end.as_deref()) {
            Some(end) => parse_date("end", end)?,
            None => start,
        };
        if end < start {
            return Err(CalendarError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let kind = match non_blank(self.kind.as_deref()) {
            Some(kind) => kind.parse()?,
            None => EventType::default(),
        };

        let link = self.link.as_deref().map(str::trim).unwrap_or_default();
        if !link.is_empty() {
            validate_link(link)?;
        }

        Ok(EventDraft {
            start,
            end,
            title: LocalizedText::new(title_zh, self.title_en.as_deref().unwrap_or("").trim()),
            description: LocalizedText::new(
                self.description_zh.unwrap_or_default(),
                self.description_en.unwrap_or_default(),
            ),
            kind,
            grade: Grades::parse(&self.grade)?,
            link: link.to_string(),
        })
    }
}

impl EventDraft {
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            start: self.start,
            end: self.end,
            title: self.title,
            description: self.description,
            kind: self.kind,
            grade: self.grade,
            link: self.link,
        }
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        EventDraft {
            start: event.start,
            end: event.end,
            title: event.title.clone(),
            description: event.description.clone(),
            kind: event.kind,
            grade: event.grade.clone(),
            link: event.link.clone(),
        }
    }
}

/// Trimmed value, or None when absent or blank
pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn validate_link(link: &str) -> CalendarResult<()> {
    match url::Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(CalendarError::InvalidLink(link.to_string())),
    }
}
