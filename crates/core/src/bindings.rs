//! Element lookups, resolved once when the dashboard starts.
//!
//! The kiosk page has gone through several layouts, so most regions can live
//! under more than one id. Each region takes the first candidate the page
//! actually has; a region with no match is left unbound and every later
//! render for it is a no-op.

use signage_protocol::{TickerDoc, WeatherKind};

use crate::model::{ElementId, LaneBinding};

/// Read access to the page's element ids.
pub trait Page {
    fn has_element(&self, id: &str) -> bool;
}

const STATUS_IDS: &[&str] = &["status"];
const TODAY_IDS: &[&str] = &["today"];
const TOMORROW_IDS: &[&str] = &["tomorrow"];
const WEEK_IDS: &[&str] = &["week", "week-grid"];
const MONTH_IDS: &[&str] = &["month", "month-grid"];
const FLEET_IDS: &[&str] = &["truckPanelBody"];

const MASTER_LANE: (&str, &str) = ("ticker-master", "ticker-master-text");
const INSTALL_LANE: (&str, &str) = ("ticker-install", "ticker-install-text");
const COMBINED_WEATHER_LANE: (&str, &str) = ("ticker-weather-top", "ticker-weather-top-text");

const SHOP_WEATHER_LANES: &[&str] = &[
    "ticker-shopwx",
    "ticker-shop-weather",
    "tickerShopWeather",
    "ticker-weather-shop",
];
const SHOP_WEATHER_TEXTS: &[&str] = &[
    "ticker-shopwx-text",
    "ticker-shop-weather-text",
    "tickerShopWeatherText",
    "ticker-weather-shop-text",
];
const JOBS_WEATHER_LANES: &[&str] = &[
    "ticker-jobwx",
    "ticker-jobs-weather",
    "tickerJobsWeather",
    "ticker-weather-jobs",
];
const JOBS_WEATHER_TEXTS: &[&str] = &[
    "ticker-jobwx-text",
    "ticker-jobs-weather-text",
    "tickerJobsWeatherText",
    "ticker-weather-jobs-text",
];

/// Regions that receive markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Status,
    Today,
    Tomorrow,
    Week,
    Month,
    Fleet,
}

impl Region {
    pub const CALENDAR: [Region; 4] = [Region::Today, Region::Tomorrow, Region::Week, Region::Month];
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Status => "status",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::Week => "week",
            Self::Month => "month",
            Self::Fleet => "fleet",
        })
    }
}

/// How the page shows weather.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WeatherLanes {
    #[default]
    None,
    /// One lane showing both feeds.
    Combined(LaneBinding),
    /// Older layouts: a lane per feed, either of which may be missing.
    Separate {
        shop: Option<LaneBinding>,
        jobs: Option<LaneBinding>,
    },
}

impl WeatherLanes {
    /// Lane for one feed in the separate layout.
    pub fn lane(&self, kind: WeatherKind) -> Option<&LaneBinding> {
        match (self, kind) {
            (Self::Separate { shop, .. }, WeatherKind::Shop) => shop.as_ref(),
            (Self::Separate { jobs, .. }, WeatherKind::Jobs) => jobs.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    pub status: Option<ElementId>,
    pub today: Option<ElementId>,
    pub tomorrow: Option<ElementId>,
    pub week: Option<ElementId>,
    pub month: Option<ElementId>,
    pub fleet: Option<ElementId>,
    pub master: Option<LaneBinding>,
    pub install: Option<LaneBinding>,
    pub weather: WeatherLanes,
}

fn first_present<P: Page + ?Sized>(page: &P, candidates: &[&str]) -> Option<ElementId> {
    candidates
        .iter()
        .find(|id| page.has_element(id))
        .map(|id| ElementId::from(*id))
}

fn lane<P: Page + ?Sized>(page: &P, (lane, text): (&str, &str)) -> Option<LaneBinding> {
    (page.has_element(lane) && page.has_element(text)).then(|| LaneBinding::new(lane, text))
}

fn lane_from<P: Page + ?Sized>(page: &P, lanes: &[&str], texts: &[&str]) -> Option<LaneBinding> {
    Some(LaneBinding {
        lane: first_present(page, lanes)?,
        text: first_present(page, texts)?,
    })
}

impl Bindings {
    pub fn resolve<P: Page + ?Sized>(page: &P) -> Self {
        let weather = if let Some(combined) = lane(page, COMBINED_WEATHER_LANE) {
            WeatherLanes::Combined(combined)
        } else {
            let shop = lane_from(page, SHOP_WEATHER_LANES, SHOP_WEATHER_TEXTS);
            let jobs = lane_from(page, JOBS_WEATHER_LANES, JOBS_WEATHER_TEXTS);
            if shop.is_none() && jobs.is_none() {
                WeatherLanes::None
            } else {
                WeatherLanes::Separate { shop, jobs }
            }
        };

        let bindings = Self {
            status: first_present(page, STATUS_IDS),
            today: first_present(page, TODAY_IDS),
            tomorrow: first_present(page, TOMORROW_IDS),
            week: first_present(page, WEEK_IDS),
            month: first_present(page, MONTH_IDS),
            fleet: first_present(page, FLEET_IDS),
            master: lane(page, MASTER_LANE),
            install: lane(page, INSTALL_LANE),
            weather,
        };
        tracing::debug!(?bindings, "resolved page bindings");
        bindings
    }

    pub fn region(&self, region: Region) -> Option<&ElementId> {
        match region {
            Region::Status => self.status.as_ref(),
            Region::Today => self.today.as_ref(),
            Region::Tomorrow => self.tomorrow.as_ref(),
            Region::Week => self.week.as_ref(),
            Region::Month => self.month.as_ref(),
            Region::Fleet => self.fleet.as_ref(),
        }
    }

    pub fn ticker_lane(&self, doc: TickerDoc) -> Option<&LaneBinding> {
        match doc {
            TickerDoc::Master => self.master.as_ref(),
            TickerDoc::Install => self.install.as_ref(),
        }
    }

    /// Every bound ticker lane, weather lanes included.
    pub fn lanes(&self) -> Vec<&LaneBinding> {
        let mut lanes: Vec<&LaneBinding> = [self.master.as_ref(), self.install.as_ref()]
            .into_iter()
            .flatten()
            .collect();
        match &self.weather {
            WeatherLanes::None => {}
            WeatherLanes::Combined(combined) => lanes.push(combined),
            WeatherLanes::Separate { shop, jobs } => {
                lanes.extend(shop.iter().chain(jobs.iter()));
            }
        }
        lanes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Ids(HashSet<&'static str>);

    impl Ids {
        fn new(ids: &[&'static str]) -> Self {
            Self(ids.iter().copied().collect())
        }
    }

    impl Page for Ids {
        fn has_element(&self, id: &str) -> bool {
            self.0.contains(id)
        }
    }

    #[test]
    fn prefers_first_candidate() {
        let page = Ids::new(&["week-grid", "month", "month-grid", "status"]);
        let b = Bindings::resolve(&page);
        assert_eq!(b.week.as_ref().map(ElementId::as_str), Some("week-grid"));
        assert_eq!(b.month.as_ref().map(ElementId::as_str), Some("month"));
        assert!(b.today.is_none());
        assert!(b.region(Region::Today).is_none());
        assert!(b.region(Region::Status).is_some());
    }

    #[test]
    fn lane_needs_both_elements() {
        let page = Ids::new(&["ticker-master", "ticker-install", "ticker-install-text"]);
        let b = Bindings::resolve(&page);
        assert!(b.ticker_lane(TickerDoc::Master).is_none());
        assert_eq!(
            b.ticker_lane(TickerDoc::Install),
            Some(&LaneBinding::new("ticker-install", "ticker-install-text"))
        );
    }

    #[test]
    fn combined_weather_wins_over_separate_lanes() {
        let page = Ids::new(&[
            "ticker-weather-top",
            "ticker-weather-top-text",
            "ticker-shopwx",
            "ticker-shopwx-text",
        ]);
        let b = Bindings::resolve(&page);
        assert!(matches!(b.weather, WeatherLanes::Combined(_)));
        assert!(b.weather.lane(WeatherKind::Shop).is_none());
    }

    #[test]
    fn legacy_weather_ids_mix_candidates() {
        let page = Ids::new(&["tickerShopWeather", "ticker-weather-shop-text"]);
        let b = Bindings::resolve(&page);
        assert_eq!(
            b.weather.lane(WeatherKind::Shop),
            Some(&LaneBinding::new("tickerShopWeather", "ticker-weather-shop-text"))
        );
        assert!(b.weather.lane(WeatherKind::Jobs).is_none());
        assert_eq!(b.lanes().len(), 1);
    }

    #[test]
    fn empty_page_binds_nothing() {
        let b = Bindings::resolve(&Ids::new(&[]));
        assert_eq!(b, Bindings::default());
        assert!(b.lanes().is_empty());
    }
}
