pub mod alarm;
pub mod attendee;
pub mod calendar_type;
pub mod event;

pub use alarm::SharedEvent;
pub use attendee::Attendee;
pub use calendar_type::Calendar;
pub use event::{AlarmCallback, Event, YMD_HIS};
