//! Calendar group schedule model
//!
//! Recurring availability rules (`ScheduleSetting`) and the concrete
//! bookable windows (`TimeslotInstance`) expanded from them.

mod slot;
mod types;
mod wall_clock;

pub use slot::TimeslotInstance;
pub use types::{CalendarGroup, Recurrence, RecurrencePattern, ScheduleSetting, TimePeriod, Weekday};

/// Generate a temporary client-side identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
