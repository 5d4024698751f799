//! スケジュール検証・予約枠展開モジュール
//!
//! カレンダーグループのスケジュール設定の競合検出、入力検証、
//! 編集操作、日付範囲への予約枠の展開を提供します。

pub mod config;
pub mod conflict;
pub mod draft;
pub mod error;
pub mod timeslot;
pub mod validate;

pub use config::{load_calendar_group, parse_calendar_group};
pub use conflict::{PrecedenceNote, ScheduleConflict, detect_conflict, precedence_notes};
pub use draft::ScheduleDraft;
pub use error::{Result, ScheduleError};
pub use timeslot::{
    BookedCount, BookingTally, apply_bookings, group_by_date, materialize_timeslots, month_range,
    timeslots,
};
pub use validate::{
    FieldError, FieldErrorKind, ValidationReport, validate_for, validate_schedule,
    validate_setting,
};
