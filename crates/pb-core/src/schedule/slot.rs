//! Materialized timeslot type

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A concrete, dated, bookable window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeslotInstance {
    pub date: NaiveDate,
    #[serde(with = "crate::schedule::wall_clock")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::schedule::wall_clock")]
    pub end_time: NaiveTime,
    /// Remaining capacity
    pub vacancies: u32,
    /// Setting the slot was expanded from
    pub setting_id: String,
    /// Time period the slot was expanded from
    pub period_id: String,
}

impl TimeslotInstance {
    /// Local date-time the slot starts at
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }
}
