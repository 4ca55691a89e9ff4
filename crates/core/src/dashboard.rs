//! Display state and the handlers that apply feed results to it.
//!
//! A [`Dashboard`] owns the surface together with everything that has to
//! survive between polls: resolved bindings, ticker lanes, the last good
//! weather readings and the pending fit request. Handlers run one at a time
//! and never block; the host calls [`Dashboard::paint`] after each one.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use signage_protocol::{
    EventsResponse, FleetResponse, TickerDoc, TickerResponse, WeatherKind, WeatherResponse,
};

use crate::bindings::{Bindings, Region, WeatherLanes};
use crate::bucketing::WeekMode;
use crate::fit::{self, FitQueue};
use crate::model::LaneBinding;
use crate::surface::Surface;
use crate::ticker::TickerEngine;
use crate::views::fleet::{render_fleet, render_fleet_unreachable, render_no_trucks};
use crate::views::weather::{format_combined, format_weather_line};
use crate::views::{CalendarView, TimeStyle, ViewError, render_calendar, render_status};

/// A failed fetch as seen by the dashboard.
pub trait FeedError: std::fmt::Display {
    /// The proxy answered but refused (`ok: false`) or left out the data
    /// the feed requires, as opposed to the request itself failing.
    fn is_rejection(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    pub week_mode: WeekMode,
    pub time_style: TimeStyle,
    pub weather_enabled: bool,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            week_mode: WeekMode::default(),
            time_style: TimeStyle::default(),
            weather_enabled: true,
        }
    }
}

/// Which weather requests the page needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherFeeds {
    Off,
    /// Both feeds, delivered together for the combined lane.
    Combined,
    /// The listed feeds, each delivered on its own.
    Separate(Vec<WeatherKind>),
}

/// Last successful reading per weather feed.
#[derive(Debug, Clone, Default)]
pub struct WeatherCache {
    shop: Option<WeatherResponse>,
    jobs: Option<WeatherResponse>,
}

impl WeatherCache {
    pub fn get(&self, kind: WeatherKind) -> Option<&WeatherResponse> {
        match kind {
            WeatherKind::Shop => self.shop.as_ref(),
            WeatherKind::Jobs => self.jobs.as_ref(),
        }
    }

    pub fn remember(&mut self, kind: WeatherKind, reading: WeatherResponse) {
        match kind {
            WeatherKind::Shop => self.shop = Some(reading),
            WeatherKind::Jobs => self.jobs = Some(reading),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct Dashboard<S: Surface> {
    surface: S,
    bindings: Bindings,
    options: DashboardOptions,
    tickers: TickerEngine,
    weather: WeatherCache,
    fit_queue: FitQueue,
}

impl<S: Surface> Dashboard<S> {
    pub fn new(surface: S, options: DashboardOptions) -> Self {
        let bindings = Bindings::resolve(&surface);
        Self {
            surface,
            bindings,
            options,
            tickers: TickerEngine::new(),
            weather: WeatherCache::default(),
            fit_queue: FitQueue::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    pub fn tickers(&self) -> &TickerEngine {
        &self.tickers
    }

    pub fn weather_cache(&self) -> &WeatherCache {
        &self.weather
    }

    pub fn fit_pending(&self) -> bool {
        self.fit_queue.is_queued()
    }

    /// Ticker documents with a lane on the page.
    pub fn ticker_docs(&self) -> Vec<TickerDoc> {
        TickerDoc::ALL
            .into_iter()
            .filter(|doc| self.bindings.ticker_lane(*doc).is_some())
            .collect()
    }

    pub fn weather_feeds(&self) -> WeatherFeeds {
        if !self.options.weather_enabled {
            return WeatherFeeds::Off;
        }
        match &self.bindings.weather {
            WeatherLanes::None => WeatherFeeds::Off,
            WeatherLanes::Combined(_) => WeatherFeeds::Combined,
            WeatherLanes::Separate { .. } => WeatherFeeds::Separate(
                WeatherKind::ALL
                    .into_iter()
                    .filter(|kind| self.bindings.weather.lane(*kind).is_some())
                    .collect(),
            ),
        }
    }

    pub fn wants_fleet(&self) -> bool {
        self.bindings.fleet.is_some()
    }

    pub fn set_status(&mut self, text: &str) {
        tracing::info!(status = text);
        if let Some(id) = &self.bindings.status {
            self.surface.set_text(id, &render_status(text));
        }
    }

    pub fn boot(&mut self) {
        self.set_status("Booting…");
    }

    pub fn calendar_requested(&mut self) {
        self.set_status("Fetching calendar…");
    }

    /// Apply a calendar poll.
    ///
    /// On success every calendar view is rebuilt for `now` and a fit pass is
    /// queued. Each view is built on its own: one that fails shows its error
    /// and the others still render. A failed poll only touches the status
    /// line and regions that have nothing to show yet.
    pub fn apply_events<Tz: TimeZone, E: FeedError>(
        &mut self,
        result: Result<EventsResponse, E>,
        now: &DateTime<Tz>,
    ) {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "calendar fetch failed");
                let message = err.to_string();
                self.set_status(&format!("Calendar error: {message}"));
                for view in CalendarView::ALL {
                    let Some(id) = self.bindings.region(calendar_region(view)) else {
                        continue;
                    };
                    if self.surface.is_blank(id) {
                        self.surface.set_html(id, &view.render_error(&message));
                    }
                }
                return;
            }
        };

        let views = render_calendar(
            &response,
            now,
            self.options.week_mode,
            self.options.time_style,
        );
        let total = views.total;
        for (view, html) in views.into_views() {
            self.commit(view, html);
        }

        self.fit_queue.request();
        self.set_status(&format!("Loaded. Events total: {total}"));
    }

    fn commit(&mut self, view: CalendarView, html: Result<String, ViewError>) {
        let region = calendar_region(view);
        let Some(id) = self.bindings.region(region) else {
            return;
        };
        match html {
            Ok(html) => self.surface.set_html(id, &html),
            Err(err) => {
                tracing::warn!(%region, error = %err, "view failed to render");
                self.surface.set_html(id, &view.render_error(&err.to_string()));
            }
        }
    }

    pub fn apply_ticker<E: FeedError>(&mut self, doc: TickerDoc, result: Result<TickerResponse, E>) {
        let Some(lane) = self.bindings.ticker_lane(doc).cloned() else {
            return;
        };
        match result {
            Ok(response) => {
                let text = response.text.unwrap_or_default();
                self.tickers.set_text(&mut self.surface, &lane, &text);
            }
            Err(err) => {
                tracing::warn!(%doc, error = %err, "ticker fetch failed");
                let message = if err.is_rejection() {
                    "Ticker error: bad response".to_string()
                } else {
                    format!("Ticker error: {err}")
                };
                self.tickers.show_error(&mut self.surface, &lane, &message);
            }
        }
    }

    /// Apply one feed to its own lane (separate layout).
    pub fn apply_weather<E: FeedError>(
        &mut self,
        kind: WeatherKind,
        result: Result<WeatherResponse, E>,
    ) {
        if !self.options.weather_enabled {
            return;
        }
        let Some(lane) = self.bindings.weather.lane(kind).cloned() else {
            return;
        };
        match result {
            Ok(response) => {
                let line = format_weather_line(kind, &response);
                self.weather.remember(kind, response);
                self.tickers.set_text(&mut self.surface, &lane, &line);
            }
            Err(err) => {
                tracing::warn!(%kind, error = %err, "weather fetch failed");
                let message = if err.is_rejection() {
                    format!("{}: unavailable", kind.label())
                } else {
                    format!("{}: {err}", kind.label())
                };
                self.tickers.show_error(&mut self.surface, &lane, &message);
            }
        }
    }

    /// Apply both feeds to the combined lane in one go.
    ///
    /// Failed feeds fall back to their last good reading. The lane only
    /// shows an error when neither feed has anything to show.
    pub fn apply_weather_pair<E: FeedError>(
        &mut self,
        shop: Result<WeatherResponse, E>,
        jobs: Result<WeatherResponse, E>,
    ) {
        if !self.options.weather_enabled {
            return;
        }
        let WeatherLanes::Combined(lane) = &self.bindings.weather else {
            return;
        };
        let lane: LaneBinding = lane.clone();

        let mut failures = Vec::new();
        for (kind, result) in [(WeatherKind::Shop, shop), (WeatherKind::Jobs, jobs)] {
            match result {
                Ok(response) => self.weather.remember(kind, response),
                Err(err) => {
                    tracing::warn!(%kind, error = %err, "weather fetch failed");
                    failures.push(err.to_string());
                }
            }
        }

        let combined = format_combined(
            self.weather.get(WeatherKind::Shop),
            self.weather.get(WeatherKind::Jobs),
        );
        match combined {
            Some(text) => {
                self.tickers.set_text(&mut self.surface, &lane, &text);
            }
            None => {
                let reason = if failures.is_empty() {
                    "unavailable".to_string()
                } else {
                    failures.join(" / ")
                };
                self.tickers
                    .show_error(&mut self.surface, &lane, &format!("WEATHER: {reason}"));
            }
        }
    }

    /// Apply a fleet poll. A transport failure keeps the current panel and
    /// only fills it if it is still empty.
    pub fn apply_fleet<E: FeedError>(&mut self, result: Result<FleetResponse, E>) {
        let Some(id) = &self.bindings.fleet else {
            return;
        };
        match result {
            Ok(response) => self.surface.set_html(id, &render_fleet(&response.trucks)),
            Err(err) if err.is_rejection() => {
                tracing::warn!(error = %err, "fleet feed rejected");
                self.surface.set_html(id, &render_no_trucks());
            }
            Err(err) => {
                tracing::warn!(error = %err, "fleet fetch failed");
                if self.surface.is_blank(id) {
                    self.surface.set_html(id, &render_fleet_unreachable());
                }
            }
        }
    }

    /// The layout changed: refit and re-measure every lane.
    pub fn on_resize(&mut self) {
        self.fit_queue.request();
        self.tickers.restart_all(&mut self.surface);
    }

    /// Fonts and layout have settled after boot.
    pub fn settle(&mut self) {
        self.on_resize();
    }

    /// Run the pending fit pass, if any, then present the surface.
    pub fn paint(&mut self) {
        if self.fit_queue.take() {
            let boxes = fit::fit_pass(&mut self.surface);
            tracing::debug!(boxes, "fit pass");
        }
        self.surface.present();
    }

    /// Drop all lanes, cached readings and rendered regions, as if the page
    /// had just been loaded.
    pub fn reload(&mut self) {
        self.set_status("Reloading page…");
        self.tickers.clear();
        self.weather.clear();
        self.fit_queue = FitQueue::default();

        for region in Region::CALENDAR.into_iter().chain([Region::Fleet]) {
            if let Some(id) = self.bindings.region(region) {
                self.surface.set_html(id, "");
            }
        }
        for lane in self.bindings.lanes() {
            self.surface.set_lane_text(lane, "");
        }
    }
}

fn calendar_region(view: CalendarView) -> Region {
    match view {
        CalendarView::Today => Region::Today,
        CalendarView::Tomorrow => Region::Tomorrow,
        CalendarView::Week => Region::Week,
        CalendarView::Month => Region::Month,
    }
}
