use chrono::Datelike;

use crate::bucketing::DayBucket;
use crate::fit::FitClass;
use crate::markup::LINE_BREAK;

use super::time_format::{TimeStyle, event_time_range};
use super::{compact_line, render_error_block};

/// Body of a week card with nothing scheduled.
pub const EMPTY_DAY_PLACEHOLDER: &str = "No installs";

/// One card per bucket: a `Mon 3/11` heading and `time title` lines.
pub fn render_week(days: &[DayBucket<'_>], style: TimeStyle) -> String {
    let mut html = String::new();
    for day in days {
        let body = if day.is_empty() {
            EMPTY_DAY_PLACEHOLDER.to_string()
        } else {
            day.events
                .iter()
                .map(|ev| compact_line(&event_time_range(ev, style), ev.title()))
                .collect::<Vec<_>>()
                .join(LINE_BREAK)
        };
        html.push_str(&format!(
            "<div class=\"week-card {fit}\"><div class=\"week-card-title\">{label} <span class=\"muted\">{m}/{d}</span></div><div class=\"week-card-body fit-text\">{body}</div></div>",
            fit = FitClass::Week.css_class(),
            label = day.date.format("%a"),
            m = day.date.month(),
            d = day.date.day(),
        ));
    }
    html
}

pub fn render_week_error(message: &str) -> String {
    render_error_block("Week", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use signage_protocol::{DateInput, RawEvent};

    use crate::bucketing::{WeekMode, week_buckets};
    use crate::normalize::normalize_in;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-13T12:00:00Z")
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default()
    }

    #[test]
    fn five_cards_with_placeholders() {
        let events = normalize_in(
            &[RawEvent {
                title: Some("Install A".into()),
                start: Some(DateInput::from("2024-03-11T14:00:00Z")),
                ..RawEvent::default()
            }],
            &Utc,
        );
        let days = week_buckets(&events, &now(), WeekMode::MonFri).unwrap_or_default();
        let html = render_week(&days, TimeStyle::TwelveHour);

        assert_eq!(html.matches("week-card fit-week").count(), 5);
        assert!(html.contains("Mon <span class=\"muted\">3/11</span>"));
        assert!(html.contains("Fri <span class=\"muted\">3/15</span>"));
        assert!(html.contains("2:00 PM Install A"));
        assert_eq!(html.matches(EMPTY_DAY_PLACEHOLDER).count(), 4);
    }

    #[test]
    fn events_are_listed_in_start_order() {
        let events = normalize_in(
            &[
                RawEvent {
                    title: Some("second".into()),
                    start: Some(DateInput::from("2024-03-12T15:00:00Z")),
                    ..RawEvent::default()
                },
                RawEvent {
                    title: Some("first".into()),
                    start: Some(DateInput::from("2024-03-12T08:00:00Z")),
                    ..RawEvent::default()
                },
            ],
            &Utc,
        );
        let days = week_buckets(&events, &now(), WeekMode::MonFri).unwrap_or_default();
        let html = render_week(&days, TimeStyle::TwentyFourHour);
        assert!(html.contains("08:00 first<br>15:00 second"));
    }
}
