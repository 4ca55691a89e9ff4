//! Browser entry points.
//!
//! The page keeps its own DOM, timers and fetches; these functions only turn
//! proxy payloads (as JSON text) into markup and marquee parameters. Each
//! export is a thin wrapper over a plain function so the logic can be tested
//! off-wasm.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use signage_core::DashboardOptions;
use signage_core::ticker::{LaneMetrics, marquee_keyframes};
use signage_core::views::fleet::render_fleet;
use signage_core::views::weather::format_combined;
use signage_core::views::{CalendarView, render_calendar, render_status};
use signage_protocol::{EventsResponse, FleetResponse, WeatherResponse};
use thiserror::Error;
use wasm_bindgen::prelude::*;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timestamp out of range: {0}")]
    Time(f64),
    #[error("utc offset out of range: {0} minutes")]
    Offset(i32),
}

fn js(err: BridgeError) -> JsError {
    JsError::new(&err.to_string())
}

/// Markup for every calendar region plus the status line.
#[derive(Debug, Serialize)]
pub struct CalendarMarkup {
    pub today: String,
    pub tomorrow: String,
    pub week: String,
    pub month: String,
    pub status: String,
}

fn options(options_json: &str) -> Result<DashboardOptions, BridgeError> {
    if options_json.trim().is_empty() {
        return Ok(DashboardOptions::default());
    }
    Ok(serde_json::from_str(options_json)?)
}

/// `now_ms` is epoch milliseconds; `utc_offset_minutes` is east of UTC
/// (`-new Date().getTimezoneOffset()` in the page).
pub fn calendar_markup(
    events_json: &str,
    now_ms: f64,
    utc_offset_minutes: i32,
    options_json: &str,
) -> Result<CalendarMarkup, BridgeError> {
    let response: EventsResponse = serde_json::from_str(events_json)?;
    let options = options(options_json)?;
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(BridgeError::Offset(utc_offset_minutes))?;
    let now = DateTime::from_timestamp_millis(now_ms as i64)
        .ok_or(BridgeError::Time(now_ms))?
        .with_timezone(&offset);

    let views = render_calendar(&response, &now, options.week_mode, options.time_style);
    let status = render_status(&format!("Loaded. Events total: {}", views.total));
    let mut markup = CalendarMarkup {
        today: String::new(),
        tomorrow: String::new(),
        week: String::new(),
        month: String::new(),
        status,
    };
    for (view, html) in views.into_markup() {
        let slot = match view {
            CalendarView::Today => &mut markup.today,
            CalendarView::Tomorrow => &mut markup.tomorrow,
            CalendarView::Week => &mut markup.week,
            CalendarView::Month => &mut markup.month,
        };
        *slot = html;
    }
    Ok(markup)
}

pub fn fleet_markup(fleet_json: &str) -> Result<String, BridgeError> {
    let response: FleetResponse = serde_json::from_str(fleet_json)?;
    Ok(render_fleet(&response.trucks))
}

/// Combined weather line; either side may be an empty string.
pub fn combined_weather(shop_json: &str, jobs_json: &str) -> Result<Option<String>, BridgeError> {
    let parse = |json: &str| -> Result<Option<WeatherResponse>, BridgeError> {
        if json.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(serde_json::from_str(json)?))
        }
    };
    let shop = parse(shop_json)?;
    let jobs = parse(jobs_json)?;
    Ok(format_combined(shop.as_ref(), jobs.as_ref()))
}

/// Render the calendar regions. Returns a JSON object with `today`,
/// `tomorrow`, `week`, `month` and `status` markup.
#[wasm_bindgen]
pub fn render_views(
    events_json: &str,
    now_ms: f64,
    utc_offset_minutes: i32,
    options_json: &str,
) -> Result<String, JsError> {
    let markup =
        calendar_markup(events_json, now_ms, utc_offset_minutes, options_json).map_err(js)?;
    serde_json::to_string(&markup).map_err(|e| js(e.into()))
}

#[wasm_bindgen]
pub fn render_fleet_panel(fleet_json: &str) -> Result<String, JsError> {
    fleet_markup(fleet_json).map_err(js)
}

#[wasm_bindgen]
pub fn weather_ticker_text(shop_json: &str, jobs_json: &str) -> Result<Option<String>, JsError> {
    combined_weather(shop_json, jobs_json).map_err(js)
}

/// Padded and doubled lane text.
#[wasm_bindgen]
pub fn marquee_text(text: &str) -> String {
    signage_core::ticker::marquee_text(text.trim())
}

/// Loop duration in milliseconds for the measured lane, or `undefined` if
/// either width is zero.
#[wasm_bindgen]
pub fn ticker_duration_ms(window_px: f64, track_px: f64) -> Option<f64> {
    marquee_keyframes(LaneMetrics {
        window_px,
        track_px,
    })
    .map(|k| k.duration.as_secs_f64() * 1000.0)
}

#[wasm_bindgen]
pub fn escape_html(text: &str) -> String {
    signage_core::markup::escape_html(text)
}
