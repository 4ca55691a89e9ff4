//! Typed client for the proxy's four feeds.
//!
//! Every fetch is a single attempt that either yields a complete payload or
//! a [`FetchError`]. Retrying is the scheduler's job: the next poll is the
//! retry.

pub mod transport;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use signage_protocol::{
    EventsResponse, FleetResponse, TickerDoc, TickerResponse, WeatherKind, WeatherResponse,
};

use crate::error::FetchError;

pub use transport::{HttpTransport, JsonpTransport, Transport};

/// How strictly a payload's `ok` flag is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OkFlag {
    /// Absent is fine; only an explicit `false` is a rejection.
    Optional,
    /// Must be present and `true`.
    Required,
}

fn decode<R: DeserializeOwned>(
    value: Value,
    ok: OkFlag,
    required: Option<&'static str>,
) -> Result<R, FetchError> {
    let flag = value.get("ok").and_then(Value::as_bool);
    let rejected = match ok {
        OkFlag::Optional => flag == Some(false),
        OkFlag::Required => flag != Some(true),
    };
    if rejected {
        let reason = value
            .get("error")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .unwrap_or("bad response");
        return Err(FetchError::Rejected(reason.to_string()));
    }
    if let Some(field) = required.filter(|f| !value.get(f).is_some_and(Value::is_array)) {
        return Err(FetchError::Missing(field));
    }
    Ok(serde_json::from_value(value)?)
}

#[derive(Debug)]
pub struct DataSource<T> {
    base: Url,
    transport: T,
}

impl<T: Transport> DataSource<T> {
    /// # Errors
    /// Fails if `proxy_url` is not an absolute URL.
    pub fn new(proxy_url: &str, transport: T) -> Result<Self, FetchError> {
        let trimmed = proxy_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        Ok(Self { base, transport })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Proxy URL with `params` appended to its query.
    pub fn url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().extend_pairs(params);
        url
    }

    #[tracing::instrument(level = "debug", skip(self), err(Display))]
    pub async fn fetch_events(&self) -> Result<EventsResponse, FetchError> {
        let value = self
            .transport
            .get_json(self.url(&[("mode", "events")]))
            .await?;
        decode(value, OkFlag::Optional, Some("events"))
    }

    #[tracing::instrument(level = "debug", skip(self), err(Display))]
    pub async fn fetch_ticker(&self, doc: TickerDoc) -> Result<TickerResponse, FetchError> {
        let value = self
            .transport
            .get_json(self.url(&[("mode", "ticker"), ("doc", doc.as_param())]))
            .await?;
        decode(value, OkFlag::Required, None)
    }

    #[tracing::instrument(level = "debug", skip(self), err(Display))]
    pub async fn fetch_weather(&self, kind: WeatherKind) -> Result<WeatherResponse, FetchError> {
        let value = self
            .transport
            .get_json(self.url(&[("mode", "weather"), ("kind", kind.as_param())]))
            .await?;
        decode(value, OkFlag::Required, None)
    }

    /// Both weather feeds, fetched concurrently.
    pub async fn fetch_weather_pair(
        &self,
    ) -> (
        Result<WeatherResponse, FetchError>,
        Result<WeatherResponse, FetchError>,
    ) {
        tokio::join!(
            self.fetch_weather(WeatherKind::Shop),
            self.fetch_weather(WeatherKind::Jobs)
        )
    }

    #[tracing::instrument(level = "debug", skip(self), err(Display))]
    pub async fn fetch_fleet_status(&self) -> Result<FleetResponse, FetchError> {
        let value = self
            .transport
            .get_json(self.url(&[("mode", "truckStatus")]))
            .await?;
        decode(value, OkFlag::Required, Some("trucks"))
    }
}
