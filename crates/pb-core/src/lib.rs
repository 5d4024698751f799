//! pb-core: petbook scheduling core library
//!
//! Calendar group schedule model, timeslot types and the shared
//! configuration used by the scheduling crates.

pub mod config;
pub mod error;
pub mod schedule;

pub use config::{ApiConfig, Config, ScheduleRules};
pub use error::{Error, Result};
pub use schedule::{
    CalendarGroup, Recurrence, RecurrencePattern, ScheduleSetting, TimePeriod, TimeslotInstance,
    Weekday,
};
