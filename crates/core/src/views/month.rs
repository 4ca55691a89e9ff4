use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::bucketing::{DayBucket, MONTH_CELL_LIMIT, MonthCell};
use crate::fit::FitClass;
use crate::markup::LINE_BREAK;

use super::time_format::{TimeStyle, event_time_range};
use super::{compact_line, render_error_block};

const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Render the month grid: a Sun..Sat header row followed by `cells`.
///
/// Day cells list up to [`MONTH_CELL_LIMIT`] events from `buckets` and a
/// `+N more` line for the rest. The cell for `today` gets the `today` class.
pub fn render_month(
    cells: &[MonthCell],
    buckets: &BTreeMap<NaiveDate, DayBucket<'_>>,
    today: NaiveDate,
    style: TimeStyle,
) -> String {
    let mut html: String = WEEKDAY_HEADERS
        .iter()
        .map(|dow| format!("<div class=\"month-dow\">{dow}</div>"))
        .collect();

    for cell in cells {
        let date = match cell {
            MonthCell::Blank => {
                html.push_str("<div class=\"month-cell empty\"></div>");
                continue;
            }
            MonthCell::Day(date) => *date,
        };

        let mut lines = Vec::new();
        if let Some(bucket) = buckets.get(&date) {
            lines.extend(
                bucket
                    .shown(MONTH_CELL_LIMIT)
                    .iter()
                    .map(|ev| compact_line(&event_time_range(ev, style), ev.title())),
            );
            let more = bucket.overflow(MONTH_CELL_LIMIT);
            if more > 0 {
                lines.push(format!("+{more} more"));
            }
        }

        let today_class = if date == today { " today" } else { "" };
        html.push_str(&format!(
            "<div class=\"month-cell{today_class} {fit}\"><div class=\"month-day\">{day}</div><div class=\"month-body fit-text\">{body}</div></div>",
            fit = FitClass::Month.css_class(),
            day = date.day(),
            body = lines.join(LINE_BREAK),
        ));
    }
    html
}

pub fn render_month_error(message: &str) -> String {
    render_error_block("Month", message)
}
