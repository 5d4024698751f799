//! 送信前のスケジュール検証
//!
//! 項目単位の検証（日付範囲、予約可能期間、時間帯）を行い、
//! 問題がなければ設定間の競合検出を行います。

use chrono::{Months, NaiveDate};
use pb_core::{ScheduleRules, ScheduleSetting};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conflict::{PrecedenceNote, ScheduleConflict, detect_conflict, precedence_notes};

/// 項目エラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldErrorKind {
    /// 設定が 1 件もない
    EmptySchedule,
    /// 終了日が開始日より前
    EndBeforeStart,
    /// 終了日が予約可能期間を超えている
    BeyondBookingHorizon,
    /// 時間帯がない
    NoTimePeriods,
    /// 終了時刻が開始時刻以前
    InvalidTimePeriod,
    /// 受付人数が 0
    NoVacancies,
    /// Weekly なのに曜日がない
    NoWeekdays,
    /// 同じ設定内で時間帯が重なっている
    OverlappingTimePeriods,
}

/// 項目エラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub kind: FieldErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_index: Option<usize>,
    pub message: String,
}

impl FieldError {
    fn setting(index: usize, kind: FieldErrorKind, message: String) -> Self {
        Self {
            kind,
            setting_index: Some(index),
            period_index: None,
            message,
        }
    }

    fn period(index: usize, period: usize, kind: FieldErrorKind, message: String) -> Self {
        Self {
            kind,
            setting_index: Some(index),
            period_index: Some(period),
            message,
        }
    }
}

/// 検証結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub field_errors: Vec<FieldError>,
    /// 最初に見つかった競合（項目エラーがある場合は未検査）
    pub conflict: Option<ScheduleConflict>,
    /// Daily による上書きの通知
    pub notes: Vec<PrecedenceNote>,
}

impl ValidationReport {
    /// 送信可能かどうか
    pub fn is_ok(&self) -> bool {
        self.field_errors.is_empty() && self.conflict.is_none()
    }
}

/// 1 件の設定を検証する
///
/// `today` から `horizon_months` か月後より後の終了日は拒否されます。
pub fn validate_setting(
    index: usize,
    setting: &ScheduleSetting,
    today: NaiveDate,
    horizon_months: u32,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let recurrence = &setting.recurrence;
    let number = index + 1;

    if recurrence.end_date < recurrence.start_date {
        errors.push(FieldError::setting(
            index,
            FieldErrorKind::EndBeforeStart,
            format!(
                "Schedule {}: end date {} is before start date {}",
                number, recurrence.end_date, recurrence.start_date
            ),
        ));
    }

    if let Some(ceiling) = today.checked_add_months(Months::new(horizon_months)) {
        if recurrence.end_date > ceiling {
            errors.push(FieldError::setting(
                index,
                FieldErrorKind::BeyondBookingHorizon,
                format!(
                    "Schedule {}: end date {} is later than {} ({} months ahead)",
                    number, recurrence.end_date, ceiling, horizon_months
                ),
            ));
        }
    }

    if setting.is_weekly() && setting.days.is_empty() {
        errors.push(FieldError::setting(
            index,
            FieldErrorKind::NoWeekdays,
            format!("Schedule {}: weekly schedule has no weekdays", number),
        ));
    }

    if recurrence.time_periods.is_empty() {
        errors.push(FieldError::setting(
            index,
            FieldErrorKind::NoTimePeriods,
            format!("Schedule {}: at least one time period is required", number),
        ));
    }

    for (p, period) in recurrence.time_periods.iter().enumerate() {
        if !period.is_well_formed() {
            errors.push(FieldError::period(
                index,
                p,
                FieldErrorKind::InvalidTimePeriod,
                format!(
                    "Schedule {}: time period {} ends before it starts",
                    number,
                    period.label()
                ),
            ));
        }
        if period.vacancies == 0 {
            errors.push(FieldError::period(
                index,
                p,
                FieldErrorKind::NoVacancies,
                format!(
                    "Schedule {}: time period {} has no vacancies",
                    number,
                    period.label()
                ),
            ));
        }
    }

    // 同じ設定内の時間帯の重なり
    let periods = &recurrence.time_periods;
    for (p, earlier) in periods.iter().enumerate() {
        for (q, later) in periods.iter().enumerate().skip(p + 1) {
            if earlier.is_well_formed() && later.is_well_formed() && earlier.overlaps(later) {
                errors.push(FieldError::period(
                    index,
                    q,
                    FieldErrorKind::OverlappingTimePeriods,
                    format!(
                        "Schedule {}: time period {} overlaps {}",
                        number,
                        later.label(),
                        earlier.label()
                    ),
                ));
            }
        }
    }

    errors
}

/// スケジュール全体を検証する
///
/// 項目エラーがある場合は競合検出を行いません（不正な入力を検出器に渡さない）。
/// 上書きの通知は常に付与されます。
pub fn validate_schedule(
    settings: &[ScheduleSetting],
    today: NaiveDate,
    horizon_months: u32,
) -> ValidationReport {
    let mut field_errors = Vec::new();

    if settings.is_empty() {
        field_errors.push(FieldError {
            kind: FieldErrorKind::EmptySchedule,
            setting_index: None,
            period_index: None,
            message: "At least one schedule is required".to_string(),
        });
    }

    for (index, setting) in settings.iter().enumerate() {
        field_errors.extend(validate_setting(index, setting, today, horizon_months));
    }

    let conflict = if field_errors.is_empty() {
        detect_conflict(settings)
    } else {
        None
    };

    let report = ValidationReport {
        field_errors,
        conflict,
        notes: precedence_notes(settings),
    };

    if report.is_ok() {
        debug!(
            settings = settings.len(),
            notes = report.notes.len(),
            "スケジュール検証 OK"
        );
    } else {
        warn!(
            settings = settings.len(),
            field_errors = report.field_errors.len(),
            conflict = report.conflict.is_some(),
            "スケジュール検証でブロック"
        );
    }

    report
}

/// 設定のルール（現在日・予約可能期間）で検証する
pub fn validate_for(settings: &[ScheduleSetting], rules: &ScheduleRules) -> ValidationReport {
    validate_schedule(settings, rules.today(), rules.booking_horizon_months)
}
