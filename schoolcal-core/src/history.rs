//! Revision history of events.
//!
//! Every mutation of an event appends one `Revision`. Revisions are never
//! edited, and they outlive the event they describe.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::event::{Event, EventId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionAction {
    Create,
    Update,
    Delete,
}

impl RevisionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionAction::Create => "create",
            RevisionAction::Update => "update",
            RevisionAction::Delete => "delete",
        }
    }
}

impl FromStr for RevisionAction {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(RevisionAction::Create),
            "update" => Ok(RevisionAction::Update),
            "delete" => Ok(RevisionAction::Delete),
            other => Err(CalendarError::Serialization(format!(
                "Unknown revision action: {other}"
            ))),
        }
    }
}

impl fmt::Display for RevisionAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub date: DateTime<Utc>,
    pub action: RevisionAction,
    pub details: String,
}

impl Revision {
    pub fn created(event: &Event) -> Self {
        Revision {
            date: Utc::now(),
            action: RevisionAction::Create,
            details: format!("Created: {}", event.title.zh),
        }
    }

    /// Names the fields that differ between `before` and `after`.
    pub fn updated(before: &Event, after: &Event) -> Self {
        let changed = changed_fields(before, after);
        let details = if changed.is_empty() {
            "Updated: no changes".to_string()
        } else {
            format!("Updated: {}", changed.join(", "))
        };

        Revision {
            date: Utc::now(),
            action: RevisionAction::Update,
            details,
        }
    }

    pub fn deleted(event: &Event) -> Self {
        Revision {
            date: Utc::now(),
            action: RevisionAction::Delete,
            details: format!("Deleted: {}", event.title.zh),
        }
    }
}

/// All revisions recorded for one event id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHistory {
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

impl EventHistory {
    /// Append `revision` to the history of `event_id`, creating the entry if needed.
    pub fn append(histories: &mut Vec<EventHistory>, event_id: EventId, revision: Revision) {
        match histories.iter_mut().find(|h| h.event_id == event_id) {
            Some(history) => history.revisions.push(revision),
            None => histories.push(EventHistory {
                event_id,
                revisions: vec![revision],
            }),
        }
    }
}

fn changed_fields(before: &Event, after: &Event) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if before.start != after.start {
        changed.push("start");
    }
    if before.end != after.end {
        changed.push("end");
    }
    if before.title.zh != after.title.zh {
        changed.push("title.zh");
    }
    if before.title.en != after.title.en {
        changed.push("title.en");
    }
    if before.description.zh != after.description.zh {
        changed.push("description.zh");
    }
    if before.description.en != after.description.en {
        changed.push("description.en");
    }
    if before.kind != after.kind {
        changed.push("type");
    }
    if before.grade != after.grade {
        changed.push("grade");
    }
    if before.link != after.link {
        changed.push("link");
    }
    changed
}
