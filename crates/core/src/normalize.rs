use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone,
    Utc,
};
use signage_protocol::{DateInput, RawEvent};

use crate::model::CalendarEvent;

/// Wall-clock layouts accepted without an explicit offset. They are read in
/// the display zone.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Normalize a batch against the machine's local zone.
pub fn normalize(raw: &[RawEvent]) -> Vec<CalendarEvent> {
    normalize_in(raw, &Local)
}

/// Parse every event's start/end in `tz`, drop events without a usable
/// start, and sort the rest by start. The sort is stable, so events sharing
/// a start keep their batch order.
pub fn normalize_in<Tz: TimeZone>(raw: &[RawEvent], tz: &Tz) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = raw
        .iter()
        .filter_map(|ev| {
            let Some(start) = ev.start.as_ref().and_then(|s| parse_instant(s, tz)) else {
                tracing::debug!(title = ?ev.title, start = ?ev.start, "dropping event without a usable start");
                return None;
            };
            Some(CalendarEvent {
                raw: ev.clone(),
                start,
                end: ev.end.as_ref().and_then(|e| parse_instant(e, tz)),
            })
        })
        .collect();

    events.sort_by_key(|ev| ev.start);
    events
}

/// Parse a proxy date into an instant carrying `tz`'s offset.
///
/// Returns `None` for anything unparseable; callers treat that as "no date"
/// rather than an error.
pub fn parse_instant<Tz: TimeZone>(input: &DateInput, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    match input {
        DateInput::Text(text) => parse_text(text, tz),
        DateInput::EpochMillis(ms) => {
            if !ms.is_finite() {
                return None;
            }
            let utc = Utc.timestamp_millis_opt(*ms as i64).single()?;
            Some(utc.with_timezone(tz).fixed_offset())
        }
    }
}

fn parse_text<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(tz).fixed_offset());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(tz).fixed_offset());
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return wall_clock(naive, tz);
        }
    }

    // Date-only values mark the start of that day locally.
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    wall_clock(date.and_hms_opt(0, 0, 0)?, tz)
}

fn wall_clock<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    match tz.from_local_datetime(&naive) {
        // First occurrence on a DST fold.
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.fixed_offset()),
        // Skipped by a forward transition: read it with the offset in force
        // before the gap, which lands the same distance past the transition.
        LocalResult::None => {
            let before = tz
                .from_local_datetime(&(naive - TimeDelta::days(1)))
                .earliest()?;
            let offset = before.offset().fix().local_minus_utc();
            let utc = naive - TimeDelta::seconds(i64::from(offset));
            Some(tz.from_utc_datetime(&utc).fixed_offset())
        }
    }
}
