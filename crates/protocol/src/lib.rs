pub mod feeds;
pub mod payloads;
pub mod types;

pub use feeds::{TickerDoc, WeatherKind};
pub use payloads::{
    DateInput, EventsResponse, FleetResponse, RawEvent, TickerResponse, Truck, WeatherReading,
    WeatherResponse,
};
pub use types::Size;
