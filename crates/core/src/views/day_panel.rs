use crate::bucketing::DayBucket;
use crate::fit::FitClass;
use crate::markup::{LINE_BREAK, escape_html};

use super::time_format::{TimeStyle, event_time_range};
use super::{UNTITLED, render_error_block};

/// The two single-day panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPanel {
    Today,
    Tomorrow,
}

impl DayPanel {
    pub fn title(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
        }
    }

    pub fn fit_class(self) -> FitClass {
        match self {
            Self::Today => FitClass::Today,
            Self::Tomorrow => FitClass::Tomorrow,
        }
    }
}

/// Weather badge next to a panel heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub urgent: bool,
}

impl Badge {
    /// Trims `text`; blank or missing text means no badge.
    pub fn new(text: Option<&str>, urgent: bool) -> Option<Self> {
        let text = text?.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            urgent,
        })
    }
}

pub fn render_panel_title(title: &str, badge: Option<&Badge>) -> String {
    let title = escape_html(title);
    let Some(badge) = badge else {
        return title;
    };
    let class = if badge.urgent {
        "wx-badge wx-urgent"
    } else {
        "wx-badge"
    };
    format!(
        "{title} <span class=\"{class}\">{}</span>",
        escape_html(&badge.text)
    )
}

/// Render a Today or Tomorrow panel.
///
/// One line per event: `title (time) — location`, with the time and the
/// location left out when absent. An empty bucket renders "No events.".
pub fn render_day_panel(
    panel: DayPanel,
    bucket: &DayBucket<'_>,
    badge: Option<&Badge>,
    style: TimeStyle,
) -> String {
    let lines: Vec<String> = bucket
        .events
        .iter()
        .map(|ev| {
            let name = ev.title().map_or_else(|| UNTITLED.to_string(), escape_html);
            let time = event_time_range(ev, style);
            let time = if time.is_empty() {
                String::new()
            } else {
                format!(" ({})", escape_html(&time))
            };
            let location = ev
                .location()
                .map(|loc| format!(" — {}", escape_html(loc)))
                .unwrap_or_default();
            format!("{name}{time}{location}")
        })
        .collect();

    let body = if lines.is_empty() {
        "No events.".to_string()
    } else {
        lines.join(LINE_BREAK)
    };

    format!(
        "<div class=\"panel-title\">{}</div><div class=\"panel-body {}\"><div class=\"fit-text\">{body}</div></div>",
        render_panel_title(panel.title(), badge),
        panel.fit_class().css_class(),
    )
}

pub fn render_day_panel_error(panel: DayPanel, message: &str) -> String {
    render_error_block(panel.title(), message)
}
