use serde::{Deserialize, Serialize};

/// A date as sent by the proxy: either a date/time string or epoch
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Text(String),
    EpochMillis(f64),
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

/// One calendar entry exactly as the proxy returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: Option<DateInput>,
    #[serde(default)]
    pub end: Option<DateInput>,
    #[serde(default)]
    pub all_day: Option<bool>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `?mode=events`
///
/// `events` is mandatory: a body without it is malformed rather than empty.
/// The badge fields drive the weather "check engine light" next to the
/// Today/Tomorrow headings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub today_wx_badge: Option<String>,
    #[serde(default)]
    pub tomorrow_wx_badge: Option<String>,
    #[serde(default)]
    pub today_wx_urgent: bool,
    #[serde(default)]
    pub tomorrow_wx_urgent: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// `?mode=ticker&doc=<master|install>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Structured weather fields; every one is optional upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    #[serde(default)]
    pub temp_f: Option<f64>,
    #[serde(default)]
    pub wind_mph: Option<f64>,
    #[serde(default)]
    pub wind_dir: Option<String>,
    #[serde(default)]
    pub wind_dir_deg: Option<f64>,
    #[serde(default)]
    pub pop_pct: Option<f64>,
}

/// `?mode=weather&kind=<shop|jobs>`
///
/// The proxy answers either with preformatted `text` or with a structured
/// `weather` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub weather: Option<WeatherReading>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    #[serde(default)]
    pub truck_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// `GREEN`, `YELLOW` or `RED`; compared case-insensitively.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub sort_order: Option<f64>,
    #[serde(default)]
    pub primary_reason: Option<String>,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// `?mode=truckStatus`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetResponse {
    #[serde(default)]
    pub ok: bool,
    pub trucks: Vec<Truck>,
    #[serde(default)]
    pub error: Option<String>,
}
