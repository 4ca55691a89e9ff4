//! Native host for the signage dashboard.
//!
//! Polls the proxy on a schedule, feeds the results through the
//! `signage-core` pipeline and keeps an HTML snapshot of the kiosk page on
//! disk.

pub mod config;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod snapshot;
pub mod source;

pub use config::{DisplayZone, Settings, TransportKind};
pub use error::FetchError;
pub use scheduler::{Message, RefreshScheduler, Schedule, SchedulerHandle};
pub use snapshot::HtmlSurface;
pub use source::{DataSource, HttpTransport, JsonpTransport, Transport};
