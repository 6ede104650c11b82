//! URL-encoded form bodies.
//!
//! HTML multi-selects submit the same key several times (`grade=a&grade=b`,
//! or `grade[]=a` from some clients), which serde-based form extractors
//! cannot collect into a list. `FormFields` keeps every pair in order.

use axum::extract::{FromRequest, Request};
use schoolcal_core::{CalendarError, CalendarResult, EventId, EventInput};

use crate::routes::AdminError;

#[derive(Debug, Default)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn parse(body: &str) -> Self {
        FormFields(
            url::form_urlencoded::parse(body.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// First value submitted for `name` (or `name[]`).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values(name).next()
    }

    /// Every value submitted for `name` (or `name[]`).
    pub fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(key, _)| key == name || key.strip_suffix("[]") == Some(name))
            .map(|(_, value)| value.as_str())
    }

    /// The required `id` field.
    pub fn id(&self) -> CalendarResult<EventId> {
        parse_id(self.get("id"))
    }

    pub fn event_input(&self) -> EventInput {
        let field = |name: &str| self.get(name).map(str::to_string);
        EventInput {
            start: field("start"),
            end: field("end"),
            title_zh: field("title_zh"),
            title_en: field("title_en"),
            description_zh: field("description_zh"),
            description_en: field("description_en"),
            kind: field("type"),
            grade: self.values("grade").map(str::to_string).collect(),
            link: field("link"),
        }
    }
}

/// Parse a required event id from a form or query value.
pub fn parse_id(raw: Option<&str>) -> CalendarResult<EventId> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(CalendarError::MissingField("id"))?;
    raw.parse()
        .map_err(|_| CalendarError::InvalidId(raw.to_string()))
}

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = String::from_request(req, state).await?;
        Ok(FormFields::parse(&body))
    }
}
