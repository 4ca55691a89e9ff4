use signage_protocol::{WeatherKind, WeatherResponse};

/// Separator between the shop and jobs halves of the combined lane.
pub const COMBINED_SEPARATOR: &str = "  ⎮⎮  ";

const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass direction for a bearing in degrees. Any finite bearing
/// is accepted, negative or above 360 included.
pub fn deg_to_cardinal(deg: f64) -> Option<&'static str> {
    if !deg.is_finite() {
        return None;
    }
    let idx = (deg.rem_euclid(360.0) / 22.5).round() as usize % CARDINALS.len();
    Some(CARDINALS[idx])
}

/// Plain-text ticker line for one weather feed.
///
/// Preformatted `text` from the proxy is used as is. Otherwise the line is
/// built from the structured reading, e.g.
/// `SHOP WX: 38°F • POP 60% • Wind 12 mph NW`.
pub fn format_weather_line(kind: WeatherKind, data: &WeatherResponse) -> String {
    if let Some(text) = data.text.as_deref().filter(|t| !t.is_empty()) {
        return text.to_string();
    }

    let reading = data.weather.clone().unwrap_or_default();
    let mut parts = Vec::new();
    if let Some(temp) = reading.temp_f {
        parts.push(format!("{temp}°F"));
    }
    if let Some(pop) = reading.pop_pct {
        parts.push(format!("POP {pop}%"));
    }
    if let Some(speed) = reading.wind_mph {
        let dir = reading
            .wind_dir
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| reading.wind_dir_deg.and_then(deg_to_cardinal).map(str::to_string));
        match dir {
            Some(dir) => parts.push(format!("Wind {speed} mph {dir}")),
            None => parts.push(format!("Wind {speed} mph")),
        }
    }

    let body = if parts.is_empty() {
        "Loading…".to_string()
    } else {
        parts.join(" • ")
    };
    format!("{}: {body}", kind.label())
}

/// Text for the combined top lane from whichever readings are available.
///
/// Each half gets a `SHOP: ` / `JOBS: ` label unless the line already starts
/// with its feed name. Returns `None` when neither reading is available.
pub fn format_combined(
    shop: Option<&WeatherResponse>,
    jobs: Option<&WeatherResponse>,
) -> Option<String> {
    let shop = shop
        .map(|d| format_weather_line(WeatherKind::Shop, d))
        .filter(|l| !l.is_empty())
        .map(|l| if l.starts_with("SHOP") { l } else { format!("SHOP: {l}") });
    let jobs = jobs
        .map(|d| format_weather_line(WeatherKind::Jobs, d))
        .filter(|l| !l.is_empty())
        .map(|l| if l.starts_with("JOB") { l } else { format!("JOBS: {l}") });

    match (shop, jobs) {
        (Some(s), Some(j)) => Some(format!("{s}{COMBINED_SEPARATOR}{j}")),
        (Some(line), None) | (None, Some(line)) => Some(line),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signage_protocol::WeatherReading;

    fn structured(reading: WeatherReading) -> WeatherResponse {
        WeatherResponse {
            ok: true,
            weather: Some(reading),
            ..WeatherResponse::default()
        }
    }

    fn text(t: &str) -> WeatherResponse {
        WeatherResponse {
            ok: true,
            text: Some(t.to_string()),
            ..WeatherResponse::default()
        }
    }

    #[test]
    fn cardinal_points() {
        assert_eq!(deg_to_cardinal(0.0), Some("N"));
        assert_eq!(deg_to_cardinal(315.0), Some("NW"));
        assert_eq!(deg_to_cardinal(350.0), Some("N"));
        assert_eq!(deg_to_cardinal(-90.0), Some("W"));
        assert_eq!(deg_to_cardinal(382.5), Some("NNE"));
        assert_eq!(deg_to_cardinal(f64::NAN), None);
    }

    #[test]
    fn structured_line() {
        let data = structured(WeatherReading {
            temp_f: Some(38.0),
            wind_mph: Some(12.0),
            wind_dir: Some("NW".into()),
            pop_pct: Some(60.0),
            ..WeatherReading::default()
        });
        assert_eq!(
            format_weather_line(WeatherKind::Shop, &data),
            "SHOP WX: 38°F • POP 60% • Wind 12 mph NW"
        );
    }

    #[test]
    fn direction_from_degrees_and_fractional_values() {
        let data = structured(WeatherReading {
            temp_f: Some(41.5),
            wind_mph: Some(7.0),
            wind_dir_deg: Some(180.0),
            ..WeatherReading::default()
        });
        assert_eq!(
            format_weather_line(WeatherKind::Jobs, &data),
            "JOB WX: 41.5°F • Wind 7 mph S"
        );
    }

    #[test]
    fn empty_reading_is_loading() {
        let data = structured(WeatherReading::default());
        assert_eq!(
            format_weather_line(WeatherKind::Shop, &data),
            "SHOP WX: Loading…"
        );
    }

    #[test]
    fn text_is_verbatim() {
        assert_eq!(
            format_weather_line(WeatherKind::Jobs, &text("Sunny and 70")),
            "Sunny and 70"
        );
    }

    #[test]
    fn combined_adds_missing_labels() {
        let shop = text("Sunny");
        let jobs = structured(WeatherReading {
            temp_f: Some(50.0),
            ..WeatherReading::default()
        });
        assert_eq!(
            format_combined(Some(&shop), Some(&jobs)).as_deref(),
            Some("SHOP: Sunny  ⎮⎮  JOB WX: 50°F")
        );
        assert_eq!(
            format_combined(None, Some(&text("Rain"))).as_deref(),
            Some("JOBS: Rain")
        );
        assert_eq!(format_combined(None, None), None);
    }
}
