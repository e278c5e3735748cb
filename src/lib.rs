pub mod calendar;
pub mod config;

pub use calendar::{Attendee, Calendar, Event, SharedEvent, YMD_HIS};
