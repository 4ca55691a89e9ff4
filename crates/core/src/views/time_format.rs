use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::CalendarEvent;

/// Clock style for event times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeStyle {
    /// `2:00 PM`
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    /// `14:00`
    #[serde(rename = "24h")]
    TwentyFourHour,
}

pub fn format_time(t: &DateTime<FixedOffset>, style: TimeStyle) -> String {
    match style {
        TimeStyle::TwelveHour => t.format("%-I:%M %p").to_string(),
        TimeStyle::TwentyFourHour => t.format("%H:%M").to_string(),
    }
}

/// "All day", "2:00 PM", or "2:00 PM - 3:30 PM". Without a start there is
/// nothing to show, so the result is empty.
pub fn time_range(
    start: Option<&DateTime<FixedOffset>>,
    end: Option<&DateTime<FixedOffset>>,
    all_day: bool,
    style: TimeStyle,
) -> String {
    let Some(start) = start else {
        return String::new();
    };
    if all_day {
        return "All day".to_string();
    }
    let start = format_time(start, style);
    match end {
        Some(end) => format!("{start} - {}", format_time(end, style)),
        None => start,
    }
}

pub fn event_time_range(ev: &CalendarEvent, style: TimeStyle) -> String {
    time_range(Some(&ev.start), ev.end.as_ref(), ev.is_all_day(), style)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).expect("valid timestamp")
    }

    #[test]
    fn twelve_hour_range() {
        let start = at("2024-03-11T14:00:00-05:00");
        let end = at("2024-03-11T15:30:00-05:00");
        assert_eq!(
            time_range(Some(&start), Some(&end), false, TimeStyle::TwelveHour),
            "2:00 PM - 3:30 PM"
        );
    }

    #[test]
    fn twenty_four_hour_start_only() {
        let start = at("2024-03-11T09:05:00+01:00");
        assert_eq!(
            time_range(Some(&start), None, false, TimeStyle::TwentyFourHour),
            "09:05"
        );
    }

    #[test]
    fn all_day_wins_over_times() {
        let start = at("2024-03-11T00:00:00Z");
        assert_eq!(
            time_range(Some(&start), Some(&start), true, TimeStyle::TwelveHour),
            "All day"
        );
    }

    #[test]
    fn missing_start_renders_nothing() {
        assert_eq!(time_range(None, None, true, TimeStyle::TwelveHour), "");
    }
}
