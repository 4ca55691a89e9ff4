pub mod event;
pub mod lane;

pub use event::CalendarEvent;
pub use lane::{ElementId, LaneBinding};
