//! スケジュール競合検出
//!
//! 同じカレンダーグループ内の設定同士で、同じ日に予約枠が重なる組み合わせを検出します。
//! Daily と Weekly の重なりは競合ではなく、Daily が優先されます（`precedence_notes` で通知）。

use std::collections::BTreeSet;

use chrono::NaiveDate;
use pb_core::{RecurrencePattern, ScheduleSetting, TimePeriod, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 送信をブロックする競合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConflict {
    /// 競合する設定のうち先頭側のインデックス
    pub index_a: usize,
    /// 競合する設定のうち後方側のインデックス (`index_a < index_b`)
    pub index_b: usize,
    /// ユーザー向けメッセージ
    pub message: String,
}

/// Daily 設定が Weekly 設定を上書きすることの通知（ブロックしない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecedenceNote {
    pub daily_index: usize,
    pub weekly_index: usize,
    /// 上書きが発生する期間（両端含む）
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub message: String,
}

/// 最初に見つかった競合を返す
///
/// 設定のペア `(i, j)`, `i < j` を配列順に調べ、最初に競合したペアで打ち切ります。
/// 不正な設定（終了日が開始日より前、時間帯なし）は競合を生みません。
pub fn detect_conflict(settings: &[ScheduleSetting]) -> Option<ScheduleConflict> {
    for (i, a) in settings.iter().enumerate() {
        for (j, b) in settings.iter().enumerate().skip(i + 1) {
            if let Some(conflict) = conflict_between(i, a, j, b) {
                debug!(index_a = i, index_b = j, "スケジュールの競合を検出");
                return Some(conflict);
            }
        }
    }

    debug!(settings = settings.len(), "スケジュールの競合なし");
    None
}

fn conflict_between(
    i: usize,
    a: &ScheduleSetting,
    j: usize,
    b: &ScheduleSetting,
) -> Option<ScheduleConflict> {
    if !a.is_well_formed() || !b.is_well_formed() {
        return None;
    }

    let (from, to) = a.recurrence.date_overlap(&b.recurrence)?;

    let label = match (a.pattern(), b.pattern()) {
        (RecurrencePattern::Weekly, RecurrencePattern::Weekly) => {
            let in_range = weekdays_between(from, to);
            let shared: Vec<&str> = a
                .days
                .intersection(&b.days)
                .filter(|day| in_range.contains(*day))
                .map(Weekday::as_str)
                .collect();
            if shared.is_empty() {
                return None;
            }
            shared.join(", ")
        }
        (RecurrencePattern::Daily, RecurrencePattern::Daily) => "Daily".to_string(),
        // Daily が優先されるため競合ではない
        _ => return None,
    };

    let (period_a, period_b) = overlapping_periods(a, b)?;

    Some(ScheduleConflict {
        index_a: i,
        index_b: j,
        message: format!(
            "Schedule {} conflicts with schedule {}: {} from {} to {} ({} overlaps {})",
            i + 1,
            j + 1,
            label,
            from,
            to,
            period_a.label(),
            period_b.label()
        ),
    })
}

/// 2 つの設定の時間帯から、最初に重なるペアを探す
fn overlapping_periods<'a>(
    a: &'a ScheduleSetting,
    b: &'a ScheduleSetting,
) -> Option<(&'a TimePeriod, &'a TimePeriod)> {
    a.usable_periods()
        .flat_map(|pa| b.usable_periods().map(move |pb| (pa, pb)))
        .find(|(pa, pb)| pa.overlaps(pb))
}

/// 期間内に現れる曜日
fn weekdays_between(from: NaiveDate, to: NaiveDate) -> BTreeSet<Weekday> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .take(7)
        .map(Weekday::of)
        .collect()
}

/// Daily が Weekly を上書きする組み合わせを列挙する
///
/// 日付範囲が重なり、かつ重なった期間に Weekly 設定の曜日が含まれる場合に通知します。
pub fn precedence_notes(settings: &[ScheduleSetting]) -> Vec<PrecedenceNote> {
    let mut notes = Vec::new();

    for (i, a) in settings.iter().enumerate() {
        for (j, b) in settings.iter().enumerate().skip(i + 1) {
            if !a.is_well_formed() || !b.is_well_formed() {
                continue;
            }

            let (daily_index, daily, weekly_index, weekly) = match (a.pattern(), b.pattern()) {
                (RecurrencePattern::Daily, RecurrencePattern::Weekly) => (i, a, j, b),
                (RecurrencePattern::Weekly, RecurrencePattern::Daily) => (j, b, i, a),
                _ => continue,
            };

            let Some((from, to)) = daily.recurrence.date_overlap(&weekly.recurrence) else {
                continue;
            };

            let in_range = weekdays_between(from, to);
            if weekly.days.iter().all(|day| !in_range.contains(day)) {
                continue;
            }

            notes.push(PrecedenceNote {
                daily_index,
                weekly_index,
                from,
                to,
                message: format!(
                    "Daily schedule {} overrides weekly schedule {} ({}) from {} to {}",
                    daily_index + 1,
                    weekly_index + 1,
                    weekly.days_label(),
                    from,
                    to
                ),
            });
        }
    }

    notes
}
