//! Rendering pipeline for the kiosk dashboard.
//!
//! ```text
//!   RawEvent[] ──▶ normalize ──▶ bucketing ──▶ views ──▶ Surface ──▶ fit pass
//!   ticker text ─────────────────────────────▶ TickerEngine ──▶ Stage
//! ```
//!
//! Nothing here performs I/O. The page is reached through the [`Surface`]
//! trait and its parts ([`bindings::Page`], [`ticker::Stage`],
//! [`fit::FitTarget`]), so the same pipeline drives a browser page or a
//! rendered snapshot.

pub mod bindings;
pub mod bucketing;
pub mod dashboard;
pub mod fit;
pub mod markup;
pub mod model;
pub mod normalize;
pub mod surface;
pub mod ticker;
pub mod views;

pub use bindings::{Bindings, Page, Region, WeatherLanes};
pub use bucketing::{CalendarError, DayBucket, MonthCell, WeekMode};
pub use dashboard::{Dashboard, DashboardOptions, FeedError, WeatherCache, WeatherFeeds};
pub use fit::{FitBox, FitClass, FitQueue, FitRange, FitTarget};
pub use model::{CalendarEvent, ElementId, LaneBinding};
pub use normalize::{normalize, normalize_in};
pub use surface::Surface;
pub use ticker::{Animation, Keyframes, LaneMetrics, Stage, TickerEngine};
pub use views::{TimeStyle, ViewError};
