use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use signage_core::{DashboardOptions, TimeStyle, WeekMode};

/// Reloads shorter than this would keep the kiosk permanently rebooting.
pub const MIN_PAGE_RELOAD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub proxy_url: String,
    pub transport: TransportKind,
    pub week_mode: WeekMode,
    pub time_style: TimeStyle,
    /// IANA zone name. Unset or `local` uses the machine's zone.
    pub timezone: Option<String>,
    pub weather_tickers_enabled: bool,
    pub request_timeout_secs: u64,
    pub output: PathBuf,
    pub refresh: RefreshConfig,
    pub layout: LayoutConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Jsonp,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    pub calendar_secs: u64,
    pub ticker_secs: u64,
    pub fleet_secs: u64,
    pub page_reload_secs: u64,
    pub settle_ms: u64,
}

impl RefreshConfig {
    pub fn calendar(&self) -> Duration {
        Duration::from_secs(self.calendar_secs.max(1))
    }

    pub fn ticker(&self) -> Duration {
        Duration::from_secs(self.ticker_secs.max(1))
    }

    pub fn fleet(&self) -> Duration {
        Duration::from_secs(self.fleet_secs.max(1))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// `None` when periodic reloads are disabled.
    pub fn page_reload(&self) -> Option<Duration> {
        let every = Duration::from_secs(self.page_reload_secs);
        (every >= MIN_PAGE_RELOAD).then_some(every)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoxConfig {
    pub width_px: f64,
    pub height_px: f64,
}

/// Box sizes and font metrics the snapshot uses to estimate layout.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    pub day_panel: BoxConfig,
    pub week_card: BoxConfig,
    pub month_cell: BoxConfig,
    pub ticker_window_px: f64,
    pub ticker_font_px: f64,
    /// Average glyph advance as a fraction of the font size.
    pub char_width_em: f64,
    pub line_height_em: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Where "today" is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Local,
    Named(chrono_tz::Tz),
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("transport", "jsonp")?
        .set_default("week_mode", "mon-fri")?
        .set_default("time_style", "12h")?
        .set_default("weather_tickers_enabled", true)?
        .set_default("request_timeout_secs", 20)?
        .set_default("output", "signage.html")?
        .set_default("refresh.calendar_secs", 120)?
        .set_default("refresh.ticker_secs", 120)?
        .set_default("refresh.fleet_secs", 30)?
        .set_default("refresh.page_reload_secs", 600)?
        .set_default("refresh.settle_ms", 800)?
        .set_default("layout.day_panel.width_px", 900.0)?
        .set_default("layout.day_panel.height_px", 420.0)?
        .set_default("layout.week_card.width_px", 340.0)?
        .set_default("layout.week_card.height_px", 260.0)?
        .set_default("layout.month_cell.width_px", 240.0)?
        .set_default("layout.month_cell.height_px", 110.0)?
        .set_default("layout.ticker_window_px", 1800.0)?
        .set_default("layout.ticker_font_px", 28.0)?
        .set_default("layout.char_width_em", 0.55)?
        .set_default("layout.line_height_em", 1.2)?
        .set_default("logging.level", "info")?)
}

impl Settings {
    /// Load `signage.toml` (or `path`), then `SIGNAGE_*` environment
    /// variables on top. Nested keys use a double underscore, e.g.
    /// `SIGNAGE_REFRESH__FLEET_SECS=15`.
    ///
    /// # Errors
    /// Fails if the file or a variable cannot be parsed, or `proxy_url` is
    /// missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("signage").required(false),
        };
        let settings: Self = defaults()?
            .add_source(file)
            .add_source(
                Environment::with_prefix("SIGNAGE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .context("invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text alone, with the usual defaults.
    ///
    /// # Errors
    /// Same as [`Settings::load`].
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self = defaults()?
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()
            .context("invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.proxy_url.trim().is_empty() {
            bail!("proxy_url must not be empty");
        }
        reqwest::Url::parse(self.proxy_url.trim())
            .with_context(|| format!("proxy_url is not a valid URL: {}", self.proxy_url))?;
        self.display_zone()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            week_mode: self.week_mode,
            time_style: self.time_style,
            weather_enabled: self.weather_tickers_enabled,
        }
    }

    /// # Errors
    /// Fails on an unknown zone name.
    pub fn display_zone(&self) -> Result<DisplayZone> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("" | "local") => Ok(DisplayZone::Local),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(DisplayZone::Named)
                .map_err(|e| anyhow::anyhow!("unknown timezone {name:?}: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn defaults_fill_everything_but_the_proxy() {
        let settings = Settings::from_toml(r#"proxy_url = "https://proxy.example/exec""#)
            .expect("minimal config loads");
        assert_eq!(settings.transport, TransportKind::Jsonp);
        assert_eq!(settings.week_mode, WeekMode::MonFri);
        assert_eq!(settings.time_style, TimeStyle::TwelveHour);
        assert!(settings.weather_tickers_enabled);
        assert_eq!(settings.refresh.calendar(), Duration::from_secs(120));
        assert_eq!(settings.refresh.fleet(), Duration::from_secs(30));
        assert_eq!(settings.refresh.settle(), Duration::from_millis(800));
        assert_eq!(settings.refresh.page_reload(), Some(Duration::from_secs(600)));
        assert_eq!(settings.output, PathBuf::from("signage.html"));
        assert_eq!(settings.display_zone().ok(), Some(DisplayZone::Local));
    }

    #[test]
    fn overrides_and_short_reload_disabled() {
        let settings = Settings::from_toml(
            r#"
            proxy_url = "https://proxy.example/exec"
            transport = "http"
            week_mode = "next-5"
            time_style = "24h"
            timezone = "America/Chicago"
            weather_tickers_enabled = false

            [refresh]
            page_reload_secs = 30
            "#,
        )
        .expect("config loads");
        assert_eq!(settings.transport, TransportKind::Http);
        assert_eq!(settings.week_mode, WeekMode::Next5);
        assert_eq!(settings.time_style, TimeStyle::TwentyFourHour);
        assert_eq!(settings.refresh.page_reload(), None);
        assert_eq!(settings.refresh.ticker_secs, 120);
        assert_eq!(
            settings.display_zone().ok(),
            Some(DisplayZone::Named(chrono_tz::America::Chicago))
        );
        assert!(!settings.dashboard_options().weather_enabled);
    }

    #[test]
    fn missing_proxy_is_an_error() {
        assert!(Settings::from_toml("").is_err());
        assert!(Settings::from_toml(r#"proxy_url = "  ""#).is_err());
        assert!(Settings::from_toml(r#"proxy_url = "not a url""#).is_err());
    }

    #[test]
    fn unknown_zone_is_an_error() {
        let result = Settings::from_toml(
            r#"
            proxy_url = "https://proxy.example/exec"
            timezone = "Mars/Olympus"
            "#,
        );
        assert!(result.is_err());
    }
}
