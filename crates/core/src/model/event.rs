use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use signage_protocol::RawEvent;

/// A calendar entry whose start parsed successfully.
///
/// `start` and `end` are stored at the display zone's offset for that
/// instant, so formatting them directly yields local wall-clock times.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub raw: RawEvent,
    pub start: DateTime<FixedOffset>,
    pub end: Option<DateTime<FixedOffset>>,
}

impl CalendarEvent {
    /// Title, treating an empty string as missing.
    pub fn title(&self) -> Option<&str> {
        non_empty(self.raw.title.as_deref())
    }

    pub fn location(&self) -> Option<&str> {
        non_empty(self.raw.location.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(self.raw.description.as_deref())
    }

    pub fn is_all_day(&self) -> bool {
        self.raw.all_day.unwrap_or(false)
    }

    /// Calendar day of the start instant as seen from `tz`.
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.start.with_timezone(tz).date_naive()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
