//! Schedule model types

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::new_id;

/// Day of week a weekly setting is active on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All weekdays, Monday first
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Weekday of a calendar date
    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
            Weekday::Sun => "SUN",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => chrono::Weekday::Mon,
            Weekday::Tue => chrono::Weekday::Tue,
            Weekday::Wed => chrono::Weekday::Wed,
            Weekday::Thu => chrono::Weekday::Thu,
            Weekday::Fri => chrono::Weekday::Fri,
            Weekday::Sat => chrono::Weekday::Sat,
            Weekday::Sun => chrono::Weekday::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence pattern of a schedule setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RecurrencePattern {
    /// Every day in the date range
    #[default]
    #[serde(alias = "daily", alias = "DAILY")]
    Daily,
    /// Only on the setting's active weekdays
    #[serde(alias = "weekly", alias = "WEEKLY")]
    Weekly,
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrencePattern::Daily => f.write_str("Daily"),
            RecurrencePattern::Weekly => f.write_str("Weekly"),
        }
    }
}

/// Wall-clock window with a booking capacity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriod {
    /// Period identifier (temporary until persisted)
    #[serde(default = "new_id")]
    pub id: String,
    /// Window start
    #[serde(with = "crate::schedule::wall_clock", alias = "start_time")]
    pub start_time: NaiveTime,
    /// Window end (exclusive)
    #[serde(with = "crate::schedule::wall_clock", alias = "end_time")]
    pub end_time: NaiveTime,
    /// Concurrent bookings allowed per slot instance
    pub vacancies: u32,
}

impl TimePeriod {
    /// Create a new time period with a temporary identifier
    pub fn new(start_time: NaiveTime, end_time: NaiveTime, vacancies: u32) -> Self {
        Self {
            id: new_id(),
            start_time,
            end_time,
            vacancies,
        }
    }

    /// End strictly after start
    pub fn is_well_formed(&self) -> bool {
        self.end_time > self.start_time
    }

    /// Half-open overlap test; a window ending exactly when the other
    /// starts does not overlap it.
    pub fn overlaps(&self, other: &TimePeriod) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    /// `HH:MM-HH:MM` label
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Recurrence rule of a schedule setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    /// First day covered (inclusive)
    #[serde(alias = "start_date")]
    pub start_date: NaiveDate,
    /// Last day covered (inclusive)
    #[serde(alias = "end_date")]
    pub end_date: NaiveDate,
    #[serde(default, alias = "time_periods")]
    pub time_periods: Vec<TimePeriod>,
}

impl Recurrence {
    /// Whether `date` falls inside the inclusive date range
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Inclusive intersection of two date ranges
    pub fn date_overlap(&self, other: &Recurrence) -> Option<(NaiveDate, NaiveDate)> {
        if self.start_date <= other.end_date && other.start_date <= self.end_date {
            Some((
                self.start_date.max(other.start_date),
                self.end_date.min(other.end_date),
            ))
        } else {
            None
        }
    }
}

/// One recurrence rule of a calendar group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSetting {
    /// Setting identifier (temporary until persisted)
    #[serde(default = "new_id")]
    pub id: String,
    /// Active weekdays, only meaningful for weekly settings
    #[serde(default)]
    pub days: BTreeSet<Weekday>,
    pub recurrence: Recurrence,
}

impl ScheduleSetting {
    /// Create a new setting with a temporary identifier
    pub fn new(
        pattern: RecurrencePattern,
        days: impl IntoIterator<Item = Weekday>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        time_periods: Vec<TimePeriod>,
    ) -> Self {
        let days = match pattern {
            RecurrencePattern::Daily => BTreeSet::new(),
            RecurrencePattern::Weekly => days.into_iter().collect(),
        };

        Self {
            id: new_id(),
            days,
            recurrence: Recurrence {
                pattern,
                start_date,
                end_date,
                time_periods,
            },
        }
    }

    /// Daily setting
    pub fn daily(start_date: NaiveDate, end_date: NaiveDate, time_periods: Vec<TimePeriod>) -> Self {
        Self::new(
            RecurrencePattern::Daily,
            std::iter::empty(),
            start_date,
            end_date,
            time_periods,
        )
    }

    /// Weekly setting active on `days`
    pub fn weekly(
        days: impl IntoIterator<Item = Weekday>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        time_periods: Vec<TimePeriod>,
    ) -> Self {
        Self::new(RecurrencePattern::Weekly, days, start_date, end_date, time_periods)
    }

    pub fn pattern(&self) -> RecurrencePattern {
        self.recurrence.pattern
    }

    pub fn is_daily(&self) -> bool {
        self.recurrence.pattern == RecurrencePattern::Daily
    }

    pub fn is_weekly(&self) -> bool {
        self.recurrence.pattern == RecurrencePattern::Weekly
    }

    /// Ordered date range with at least one time period
    pub fn is_well_formed(&self) -> bool {
        self.recurrence.end_date >= self.recurrence.start_date
            && !self.recurrence.time_periods.is_empty()
    }

    /// Time periods that can produce bookable windows
    pub fn usable_periods(&self) -> impl Iterator<Item = &TimePeriod> {
        self.recurrence
            .time_periods
            .iter()
            .filter(|p| p.is_well_formed())
    }

    /// Whether the setting applies to `date` on its own, ignoring
    /// precedence between settings
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if !self.is_well_formed() || !self.recurrence.contains(date) {
            return false;
        }

        match self.recurrence.pattern {
            RecurrencePattern::Daily => true,
            RecurrencePattern::Weekly => self.days.contains(&Weekday::of(date)),
        }
    }

    /// Label used in user-facing messages: `Daily` or the active weekdays
    pub fn days_label(&self) -> String {
        match self.recurrence.pattern {
            RecurrencePattern::Daily => "Daily".to_string(),
            RecurrencePattern::Weekly => self
                .days
                .iter()
                .map(Weekday::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Named collection of schedule settings owned by a business
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarGroup {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub settings: Vec<ScheduleSetting>,
}

impl CalendarGroup {
    /// Create a new calendar group
    pub fn new(name: impl Into<String>, settings: Vec<ScheduleSetting>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            settings,
        }
    }
}
