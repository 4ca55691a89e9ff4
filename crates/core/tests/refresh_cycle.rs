//! Integration test: drive a dashboard through boot, calendar/ticker/weather/
//! fleet polls, failures, resize and reload against an in-memory page.

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use signage_core::bindings::Page;
use signage_core::fit::{FitBox, FitClass, FitTarget};
use signage_core::ticker::{Animation, Keyframes, LaneMetrics, Stage};
use signage_core::{Dashboard, DashboardOptions, ElementId, FeedError, LaneBinding, Surface};
use signage_protocol::{
    EventsResponse, FleetResponse, TickerDoc, TickerResponse, Truck, WeatherKind,
    WeatherReading, WeatherResponse,
};

#[derive(Debug)]
enum TestError {
    Rejected,
    Timeout,
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected => f.write_str("proxy said no"),
            Self::Timeout => f.write_str("request timed out"),
        }
    }
}

impl FeedError for TestError {
    fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

struct Live(Rc<Cell<usize>>);

impl Animation for Live {
    fn cancel(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

struct FixedBox;

impl FitBox for FixedBox {
    fn set_font_size(&mut self, _: f64) {}

    fn content_size(&self) -> signage_protocol::Size {
        signage_protocol::Size::new(10.0, 10.0)
    }

    fn visible_size(&self) -> signage_protocol::Size {
        signage_protocol::Size::new(100.0, 100.0)
    }
}

#[derive(Default)]
struct MemoryPage {
    ids: BTreeSet<&'static str>,
    html: BTreeMap<String, String>,
    text: BTreeMap<String, String>,
    live: Rc<Cell<usize>>,
    fitted: usize,
    presented: usize,
}

impl MemoryPage {
    fn kiosk() -> Self {
        Self {
            ids: [
                "status",
                "today",
                "tomorrow",
                "week-grid",
                "month-grid",
                "truckPanelBody",
                "ticker-master",
                "ticker-master-text",
                "ticker-install",
                "ticker-install-text",
                "ticker-weather-top",
                "ticker-weather-top-text",
            ]
            .into_iter()
            .collect(),
            ..Self::default()
        }
    }

    fn html(&self, id: &str) -> &str {
        self.html.get(id).map_or("", String::as_str)
    }

    fn text(&self, id: &str) -> &str {
        self.text.get(id).map_or("", String::as_str)
    }
}

impl Page for MemoryPage {
    fn has_element(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

impl Stage for MemoryPage {
    fn set_lane_text(&mut self, lane: &LaneBinding, text: &str) {
        self.text
            .insert(lane.text.as_str().to_string(), text.to_string());
    }

    fn measure_lane(&self, lane: &LaneBinding) -> Option<LaneMetrics> {
        let chars = self.text(lane.text.as_str()).chars().count();
        Some(LaneMetrics {
            window_px: 1000.0,
            track_px: chars as f64 * 9.0,
        })
    }

    fn animate_lane(&mut self, _: &LaneBinding, _: &Keyframes) -> Option<Box<dyn Animation>> {
        self.live.set(self.live.get() + 1);
        Some(Box::new(Live(self.live.clone())))
    }
}

impl FitTarget for MemoryPage {
    fn for_each_fit_box(&mut self, class: FitClass, f: &mut dyn FnMut(&mut dyn FitBox)) {
        let boxes: usize = self
            .html
            .values()
            .map(|html| html.matches(class.css_class()).count())
            .sum();
        for _ in 0..boxes {
            f(&mut FixedBox);
        }
        self.fitted += boxes;
    }
}

impl Surface for MemoryPage {
    fn set_html(&mut self, id: &ElementId, html: &str) {
        self.html.insert(id.as_str().to_string(), html.to_string());
    }

    fn set_text(&mut self, id: &ElementId, text: &str) {
        self.text.insert(id.as_str().to_string(), text.to_string());
    }

    fn is_blank(&self, id: &ElementId) -> bool {
        self.html(id.as_str()).is_empty()
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-11T10:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn events() -> EventsResponse {
    serde_json::from_str(include_str!("fixtures/events.json")).expect("fixture parses")
}

fn dashboard() -> Dashboard<MemoryPage> {
    Dashboard::new(MemoryPage::kiosk(), DashboardOptions::default())
}

fn ticker(text: &str) -> Result<TickerResponse, TestError> {
    Ok(TickerResponse {
        ok: true,
        text: Some(text.to_string()),
        error: None,
    })
}

#[test]
fn calendar_poll_renders_every_view_then_fits_once() {
    let mut dash = dashboard();
    dash.boot();
    assert_eq!(dash.surface().text("status"), "Status: Booting…");

    dash.calendar_requested();
    dash.apply_events::<_, TestError>(Ok(events()), &now());
    assert!(dash.fit_pending());

    let page = dash.surface();
    assert_eq!(page.text("status"), "Status: Loaded. Events total: 5");

    let today = page.html("today");
    assert!(today.contains("Today <span class=\"wx-badge wx-urgent\">Gusts 40</span>"));
    assert!(today.contains("Crew meeting (8:00 AM)<br>Install A (2:00 PM - 4:00 PM) — Bay 2"));
    assert!(!today.contains("Survey"));

    let tomorrow = page.html("tomorrow");
    assert!(tomorrow.contains("Survey &lt;north lot&gt; (9:00 AM)<br>(No title) (2:00 PM)"));
    assert!(!tomorrow.contains("wx-badge"));

    let week = page.html("week-grid");
    assert_eq!(week.matches("week-card fit-week").count(), 5);
    assert_eq!(week.matches("No installs").count(), 3);

    let month = page.html("month-grid");
    assert!(month.contains("All day Inventory"));
    assert_eq!(month.matches("month-cell today").count(), 1);

    dash.paint();
    let fitted = dash.surface().fitted;
    // Today + tomorrow panels, five week cards, 31 month days.
    assert_eq!(fitted, 2 + 5 + 31);
    assert!(!dash.fit_pending());

    dash.paint();
    assert_eq!(dash.surface().fitted, fitted, "no second pass without a request");
    assert_eq!(dash.surface().presented, 2);
}

#[test]
fn renders_are_byte_identical_on_repeat() {
    let mut dash = dashboard();
    dash.apply_events::<_, TestError>(Ok(events()), &now());
    let first = dash.surface().html.clone();
    dash.apply_events::<_, TestError>(Ok(events()), &now());
    assert_eq!(dash.surface().html, first);
}

#[test]
fn calendar_failure_keeps_rendered_views() {
    let mut dash = dashboard();
    dash.apply_events::<_, TestError>(Ok(events()), &now());
    let week = dash.surface().html("week-grid").to_string();

    dash.apply_events::<_, TestError>(Err(TestError::Timeout), &now());
    assert_eq!(dash.surface().html("week-grid"), week);
    assert_eq!(
        dash.surface().text("status"),
        "Status: Calendar error: request timed out"
    );
}

#[test]
fn calendar_failure_on_empty_page_shows_errors_under_headings() {
    let mut dash = dashboard();
    dash.apply_events::<_, TestError>(Err(TestError::Timeout), &now());
    let today = dash.surface().html("today");
    assert!(today.contains("Today"));
    assert!(today.contains("Error: request timed out"));
    assert!(dash.surface().html("month-grid").contains("Month"));
    assert!(!dash.fit_pending());
}

#[test]
fn rejected_ticker_shows_error_and_stops() {
    let mut dash = dashboard();
    let lane = ElementId::from("ticker-master");
    dash.apply_ticker(TickerDoc::Master, ticker("Welcome to the shop"));
    assert!(dash.tickers().is_running(&lane));

    dash.apply_ticker::<TestError>(TickerDoc::Master, Err(TestError::Rejected));
    assert!(!dash.tickers().is_running(&lane));
    assert_eq!(
        dash.surface().text("ticker-master-text"),
        "Ticker error: bad response"
    );
    assert_eq!(dash.surface().live.get(), 0);

    dash.apply_ticker::<TestError>(TickerDoc::Install, Err(TestError::Timeout));
    assert_eq!(
        dash.surface().text("ticker-install-text"),
        "Ticker error: request timed out"
    );
}

#[test]
fn repeated_ticker_text_keeps_one_animation() {
    let mut dash = dashboard();
    for _ in 0..4 {
        dash.apply_ticker(TickerDoc::Master, ticker("Safety first"));
        dash.apply_ticker(TickerDoc::Install, ticker("Install day"));
    }
    assert_eq!(dash.surface().live.get(), 2);

    dash.on_resize();
    dash.on_resize();
    assert_eq!(dash.surface().live.get(), 2);
    assert!(dash.fit_pending());
}

#[test]
fn combined_weather_falls_back_to_cache() {
    let mut dash = dashboard();
    let shop = WeatherResponse {
        ok: true,
        weather: Some(WeatherReading {
            temp_f: Some(38.0),
            wind_mph: Some(12.0),
            wind_dir: Some("NW".into()),
            pop_pct: Some(60.0),
            ..WeatherReading::default()
        }),
        ..WeatherResponse::default()
    };
    let jobs = WeatherResponse {
        ok: true,
        text: Some("Rain later".into()),
        ..WeatherResponse::default()
    };

    dash.apply_weather_pair::<TestError>(Ok(shop), Ok(jobs));
    let expected = "SHOP WX: 38°F • POP 60% • Wind 12 mph NW  ⎮⎮  JOBS: Rain later";
    assert_eq!(
        dash.tickers()
            .last_text(&ElementId::from("ticker-weather-top")),
        Some(expected)
    );

    dash.apply_weather_pair(Err(TestError::Timeout), Err(TestError::Timeout));
    assert_eq!(
        dash.tickers()
            .last_text(&ElementId::from("ticker-weather-top")),
        Some(expected)
    );
    assert_eq!(dash.surface().live.get(), 1);
}

#[test]
fn combined_weather_without_cache_shows_error() {
    let mut dash = dashboard();
    dash.apply_weather_pair::<TestError>(Err(TestError::Timeout), Err(TestError::Rejected));
    assert_eq!(
        dash.surface().text("ticker-weather-top-text"),
        "WEATHER: request timed out / proxy said no"
    );
    assert_eq!(dash.surface().live.get(), 0);
}

#[test]
fn separate_weather_lanes() {
    let mut page = MemoryPage::kiosk();
    page.ids.remove("ticker-weather-top");
    page.ids.extend(["ticker-shopwx", "ticker-shopwx-text"]);
    let mut dash = Dashboard::new(page, DashboardOptions::default());
    assert_eq!(
        dash.weather_feeds(),
        signage_core::WeatherFeeds::Separate(vec![WeatherKind::Shop])
    );

    dash.apply_weather::<TestError>(WeatherKind::Shop, Err(TestError::Rejected));
    assert_eq!(dash.surface().text("ticker-shopwx-text"), "SHOP WX: unavailable");
    // No jobs lane on this page.
    dash.apply_weather::<TestError>(WeatherKind::Jobs, Err(TestError::Timeout));
    assert!(dash.surface().text.get("ticker-jobwx-text").is_none());
}

#[test]
fn weather_can_be_switched_off() {
    let options = DashboardOptions {
        weather_enabled: false,
        ..DashboardOptions::default()
    };
    let mut dash = Dashboard::new(MemoryPage::kiosk(), options);
    assert_eq!(dash.weather_feeds(), signage_core::WeatherFeeds::Off);
    dash.apply_weather_pair::<TestError>(Err(TestError::Timeout), Err(TestError::Timeout));
    assert_eq!(dash.surface().text("ticker-weather-top-text"), "");
}

#[test]
fn fleet_panel_keeps_content_on_transport_failure() {
    let mut dash = dashboard();
    dash.apply_fleet::<TestError>(Err(TestError::Timeout));
    assert!(dash.surface().html("truckPanelBody").contains("Proxy error"));

    let fleet = FleetResponse {
        ok: true,
        trucks: vec![Truck {
            truck_id: Some("T7".into()),
            state: Some("yellow".into()),
            primary_reason: Some("Inspection due".into()),
            ..Truck::default()
        }],
        error: None,
    };
    dash.apply_fleet::<TestError>(Ok(fleet));
    let panel = dash.surface().html("truckPanelBody").to_string();
    assert!(panel.contains("Inspection due"));

    dash.apply_fleet::<TestError>(Err(TestError::Timeout));
    assert_eq!(dash.surface().html("truckPanelBody"), panel);

    dash.apply_fleet::<TestError>(Err(TestError::Rejected));
    assert!(dash.surface().html("truckPanelBody").contains("No active trucks"));
}

#[test]
fn reload_tears_everything_down() {
    let mut dash = dashboard();
    dash.apply_events::<_, TestError>(Ok(events()), &now());
    dash.apply_ticker(TickerDoc::Master, ticker("Hello"));
    dash.reload();

    let page = dash.surface();
    assert_eq!(page.text("status"), "Status: Reloading page…");
    assert_eq!(page.live.get(), 0);
    assert_eq!(page.html("today"), "");
    assert_eq!(page.text("ticker-master-text"), "");
    assert!(!dash.fit_pending());
    assert_eq!(dash.tickers().active_animations(), 0);
}

#[test]
fn missing_regions_are_ignored() {
    let page = MemoryPage {
        ids: ["status"].into_iter().collect(),
        ..MemoryPage::default()
    };
    let mut dash = Dashboard::new(page, DashboardOptions::default());
    dash.apply_events::<_, TestError>(Ok(events()), &now());
    dash.apply_ticker(TickerDoc::Master, ticker("Hello"));
    dash.apply_fleet::<TestError>(Err(TestError::Timeout));
    assert!(dash.surface().html.is_empty());
    assert!(dash.ticker_docs().is_empty());
    assert!(!dash.wants_fleet());
}
