//! Date range for filtering events.

use chrono::NaiveDate;

use crate::error::{CalendarError, CalendarResult};

/// Inclusive day range. `None` bounds are unbounded in that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Parse optional `YYYY-MM-DD` bounds. Blank strings count as unbounded.
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> CalendarResult<Self> {
        let from = parse_optional_date("start", from)?;
        let to = parse_optional_date("end", to)?;

        if let (Some(from), Some(to)) = (from, to)
            && to < from
        {
            return Err(CalendarError::InvalidDateRange {
                start: from.to_string(),
                end: to.to_string(),
            });
        }

        Ok(DateRange { from, to })
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Parse YYYY-MM-DD
pub fn parse_date(field: &'static str, s: &str) -> CalendarResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CalendarError::InvalidDate {
        field,
        value: s.to_string(),
    })
}

fn parse_optional_date(field: &'static str, s: Option<&str>) -> CalendarResult<Option<NaiveDate>> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(field, s).map(Some),
    }
}
