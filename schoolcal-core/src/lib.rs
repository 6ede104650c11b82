//! Core types for the school calendar service.
//!
//! This crate holds everything that is independent of HTTP:
//! - `Event` and its tags (`EventType`, `Grade`, `Grades`)
//! - `EventInput` validation into an `EventDraft`
//! - `EventFilter` for keyword/type/grade/date-range queries
//! - revision `history` records
//! - the `store` interface with JSON-file and SQLite adapters
//! - server `config` loading and CSV `export`

pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod export;
pub mod filter;
pub mod history;
pub mod input;
pub mod store;

pub use date_range::DateRange;
pub use error::{CalendarError, CalendarResult};
pub use event::*;
pub use filter::{EventFilter, EventQuery, EventSort};
pub use history::{EventHistory, Revision, RevisionAction};
pub use input::{EventDraft, EventInput};
pub use store::EventStore;
