//! Pure renderers from bucketed events and feed payloads to region markup.
//!
//! Every function here returns a `String` of HTML and touches nothing else;
//! calling one twice with the same inputs yields the same bytes. Upstream
//! text is always passed through [`escape_html`](crate::markup::escape_html)
//! before it is interpolated.

pub mod calendar;
pub mod day_panel;
pub mod fleet;
pub mod month;
pub mod time_format;
pub mod weather;
pub mod week;

use thiserror::Error;

use crate::bucketing::CalendarError;
use crate::markup::escape_html;

pub use calendar::{CalendarView, CalendarViews, render_calendar};
pub use time_format::TimeStyle;

/// Shown in place of an event without a title.
pub const UNTITLED: &str = "(No title)";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

pub fn render_status(text: &str) -> String {
    format!("Status: {text}")
}

/// Heading plus an error line, used when a view could not be built.
pub(crate) fn render_error_block(heading: &str, message: &str) -> String {
    format!(
        "<div class=\"panel-title\">{}</div><div class=\"panel-body\"><div class=\"fit-text\">Error: {}</div></div>",
        escape_html(heading),
        escape_html(message)
    )
}

/// `time title` for compact grid lines, or just the title when there is no
/// time to show.
pub(crate) fn compact_line(time: &str, title: Option<&str>) -> String {
    let title = title.map_or_else(|| UNTITLED.to_string(), escape_html);
    if time.is_empty() {
        title
    } else {
        format!("{} {title}", escape_html(time))
    }
}
