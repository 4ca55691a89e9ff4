//! The four calendar views for one calendar poll.

use chrono::{DateTime, TimeZone};
use signage_protocol::EventsResponse;

use crate::bucketing::{self, WeekMode};
use crate::normalize::normalize_in;

use super::day_panel::{Badge, DayPanel, render_day_panel, render_day_panel_error};
use super::month::{render_month, render_month_error};
use super::week::{render_week, render_week_error};
use super::{TimeStyle, ViewError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarView {
    Today,
    Tomorrow,
    Week,
    Month,
}

impl CalendarView {
    pub const ALL: [CalendarView; 4] = [
        CalendarView::Today,
        CalendarView::Tomorrow,
        CalendarView::Week,
        CalendarView::Month,
    ];

    /// Heading plus error line shown in place of this view.
    pub fn render_error(self, message: &str) -> String {
        match self {
            Self::Today => render_day_panel_error(DayPanel::Today, message),
            Self::Tomorrow => render_day_panel_error(DayPanel::Tomorrow, message),
            Self::Week => render_week_error(message),
            Self::Month => render_month_error(message),
        }
    }
}

/// Markup per view, each built independently of the others.
#[derive(Debug, PartialEq, Eq)]
pub struct CalendarViews {
    pub today: Result<String, ViewError>,
    pub tomorrow: Result<String, ViewError>,
    pub week: Result<String, ViewError>,
    pub month: Result<String, ViewError>,
    /// Events that survived normalization.
    pub total: usize,
}

impl CalendarViews {
    pub fn into_views(self) -> [(CalendarView, Result<String, ViewError>); 4] {
        [
            (CalendarView::Today, self.today),
            (CalendarView::Tomorrow, self.tomorrow),
            (CalendarView::Week, self.week),
            (CalendarView::Month, self.month),
        ]
    }

    /// Like [`into_views`](Self::into_views) with failed views replaced by
    /// their error markup.
    pub fn into_markup(self) -> [(CalendarView, String); 4] {
        self.into_views().map(|(view, html)| {
            let html = html.unwrap_or_else(|err| view.render_error(&err.to_string()));
            (view, html)
        })
    }
}

/// Normalize `response` in `now`'s zone and build every calendar view.
pub fn render_calendar<Tz: TimeZone>(
    response: &EventsResponse,
    now: &DateTime<Tz>,
    week_mode: WeekMode,
    style: TimeStyle,
) -> CalendarViews {
    let events = normalize_in(&response.events, &now.timezone());

    let badge = Badge::new(response.today_wx_badge.as_deref(), response.today_wx_urgent);
    let today = render_day_panel(
        DayPanel::Today,
        &bucketing::today(&events, now),
        badge.as_ref(),
        style,
    );

    let badge = Badge::new(
        response.tomorrow_wx_badge.as_deref(),
        response.tomorrow_wx_urgent,
    );
    let tomorrow = bucketing::tomorrow(&events, now)
        .map(|bucket| render_day_panel(DayPanel::Tomorrow, &bucket, badge.as_ref(), style))
        .map_err(ViewError::from);

    let week = bucketing::week_buckets(&events, now, week_mode)
        .map(|days| render_week(&days, style))
        .map_err(ViewError::from);

    let month = bucketing::month_grid(now)
        .map(|cells| {
            let buckets = bucketing::month_buckets(&events, now);
            render_month(&cells, &buckets, now.date_naive(), style)
        })
        .map_err(ViewError::from);

    CalendarViews {
        today: Ok(today),
        tomorrow,
        week,
        month,
        total: events.len(),
    }
}
