//! Calendar event types.
//!
//! `Event` is the normalized shape served by the public API: dates as
//! `YYYY-MM-DD`, nested bilingual `title`/`description`, and `grade` as a
//! list. Storage adapters convert to and from their own representation.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Identifier assigned by the store.
pub type EventId = i64;

/// The id given to the first event of an empty (or cleared) store.
pub const FIRST_EVENT_ID: EventId = 1;

/// A dated calendar entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub title: LocalizedText,
    pub description: LocalizedText,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub grade: Grades,
    #[serde(default)]
    pub link: String,
}

impl Event {
    /// Whether the event's [start, end] span touches the given day range.
    /// `None` bounds are open.
    pub fn overlaps(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        from.is_none_or(|from| self.end >= from) && to.is_none_or(|to| self.start <= to)
    }
}

/// Chinese and English variants of a piece of text. Missing variants are "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub zh: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    pub fn new(zh: impl Into<String>, en: impl Into<String>) -> Self {
        LocalizedText {
            zh: zh.into(),
            en: en.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    #[serde(alias = "exam")]
    ImportantExam,
    #[serde(alias = "activity")]
    SchoolActivity,
    Announcement,
    Holiday,
    Meeting,
    Lecture,
    Inspection,
    #[default]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::ImportantExam,
        EventType::SchoolActivity,
        EventType::Announcement,
        EventType::Holiday,
        EventType::Meeting,
        EventType::Lecture,
        EventType::Inspection,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ImportantExam => "important-exam",
            EventType::SchoolActivity => "school-activity",
            EventType::Announcement => "announcement",
            EventType::Holiday => "holiday",
            EventType::Meeting => "meeting",
            EventType::Lecture => "lecture",
            EventType::Inspection => "inspection",
            EventType::Other => "other",
        }
    }

    /// Label shown on the admin page
    pub fn label(&self) -> &'static str {
        match self {
            EventType::ImportantExam => "重要考試",
            EventType::SchoolActivity => "學校活動",
            EventType::Announcement => "公告",
            EventType::Holiday => "假期",
            EventType::Meeting => "會議",
            EventType::Lecture => "講座",
            EventType::Inspection => "視察",
            EventType::Other => "其他",
        }
    }
}

impl FromStr for EventType {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "exam" => Ok(EventType::ImportantExam),
            "activity" => Ok(EventType::SchoolActivity),
            other => EventType::ALL
                .into_iter()
                .find(|t| t.as_str() == other)
                .ok_or_else(|| CalendarError::UnknownEventType(other.to_string())),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audience tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "grade-1")]
    Grade1,
    #[serde(rename = "grade-2")]
    Grade2,
    #[serde(rename = "grade-3")]
    Grade3,
    #[serde(rename = "all-grades")]
    AllGrades,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Grade1, Grade::Grade2, Grade::Grade3, Grade::AllGrades];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Grade1 => "grade-1",
            Grade::Grade2 => "grade-2",
            Grade::Grade3 => "grade-3",
            Grade::AllGrades => "all-grades",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::Grade1 => "高一",
            Grade::Grade2 => "高二",
            Grade::Grade3 => "高三",
            Grade::AllGrades => "全年級",
        }
    }
}

impl FromStr for Grade {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Grade::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| CalendarError::UnknownGrade(s.to_string()))
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The grades an event targets. Never empty: an empty set becomes {all-grades}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Grade>", into = "Vec<Grade>")]
pub struct Grades(BTreeSet<Grade>);

impl Grades {
    pub fn all() -> Self {
        Grades(BTreeSet::from([Grade::AllGrades]))
    }

    /// Parse grade labels, ignoring blank entries.
    pub fn parse<I, S>(labels: I) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let grades = labels
            .into_iter()
            .filter(|s| !s.as_ref().trim().is_empty())
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<Grade>, _>>()?;
        Ok(Grades::from(grades))
    }

    /// Decode the comma-joined column form, e.g. `grade-1,grade-3`.
    pub fn parse_joined(joined: &str) -> Result<Self, CalendarError> {
        Self::parse(joined.split(','))
    }

    /// Encode as a comma-joined string.
    pub fn to_joined(&self) -> String {
        self.0
            .iter()
            .map(Grade::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn contains(&self, grade: Grade) -> bool {
        self.0.contains(&grade)
    }

    /// Substring match against any tag label.
    pub fn matches_label(&self, needle: &str) -> bool {
        self.0.iter().any(|g| g.as_str().contains(needle))
    }

    pub fn iter(&self) -> impl Iterator<Item = Grade> + '_ {
        self.0.iter().copied()
    }
}

impl Default for Grades {
    fn default() -> Self {
        Grades::all()
    }
}

impl From<Vec<Grade>> for Grades {
    fn from(grades: Vec<Grade>) -> Self {
        if grades.is_empty() {
            return Grades::all();
        }
        Grades(grades.into_iter().collect())
    }
}

impl From<Grades> for Vec<Grade> {
    fn from(grades: Grades) -> Self {
        grades.0.into_iter().collect()
    }
}
