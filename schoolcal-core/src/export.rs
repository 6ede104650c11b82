//! CSV export of events.

use std::io::Write;

use csv::Writer;

use crate::error::CalendarResult;
use crate::event::Event;

const HEADER: [&str; 10] = [
    "id",
    "start",
    "end",
    "title_zh",
    "title_en",
    "description_zh",
    "description_en",
    "type",
    "grade",
    "link",
];

/// Byte order mark so spreadsheet programs detect UTF-8 (Chinese titles).
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write events as CSV, one row per event, preceded by a header row.
pub fn write_csv<W: Write>(mut out: W, events: &[Event]) -> CalendarResult<()> {
    out.write_all(UTF8_BOM)?;

    let mut wtr = Writer::from_writer(out);
    wtr.write_record(HEADER)?;

    for ev in events {
        wtr.write_record([
            ev.id.to_string(),
            ev.start.to_string(),
            ev.end.to_string(),
            ev.title.zh.clone(),
            ev.title.en.clone(),
            ev.description.zh.clone(),
            ev.description.en.clone(),
            ev.kind.as_str().to_string(),
            ev.grade.to_joined(),
            ev.link.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Render events to an in-memory CSV document.
pub fn to_csv(events: &[Event]) -> CalendarResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, events)?;
    Ok(buf)
}
