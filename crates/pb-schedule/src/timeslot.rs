//! 予約枠の展開
//!
//! スケジュール設定を日付範囲内の具体的な予約枠 (`TimeslotInstance`) に展開します。
//! 同じ日に Daily 設定がある場合、その日の Weekly 設定はすべて無視されます。

use std::collections::{BTreeMap, HashMap};

use chrono::{Months, NaiveDate, NaiveDateTime};
use pb_core::{ScheduleSetting, TimeslotInstance};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 日付範囲内の予約枠を遅延評価で列挙する
///
/// 結果は `(date, start_time)` の昇順で、同時刻の枠は設定の並び順になります。
/// `now` 以前に始まる枠は含まれません。`range_end < range_start` の場合は空です。
pub fn timeslots<'a>(
    settings: &'a [ScheduleSetting],
    range_start: NaiveDate,
    range_end: NaiveDate,
    now: NaiveDateTime,
) -> impl Iterator<Item = TimeslotInstance> + 'a {
    let today = now.date();

    range_start
        .iter_days()
        .take_while(move |date| *date <= range_end)
        .skip_while(move |date| *date < today)
        .flat_map(move |date| slots_on(settings, date))
        .filter(move |slot| slot.starts_at() > now)
}

/// `timeslots` の結果を Vec に集める
pub fn materialize_timeslots(
    settings: &[ScheduleSetting],
    range_start: NaiveDate,
    range_end: NaiveDate,
    now: NaiveDateTime,
) -> Vec<TimeslotInstance> {
    let slots: Vec<_> = timeslots(settings, range_start, range_end, now).collect();

    debug!(
        settings = settings.len(),
        from = %range_start,
        to = %range_end,
        slots = slots.len(),
        "予約枠を展開"
    );

    slots
}

/// 1 日分の予約枠（開始時刻順）
fn slots_on(settings: &[ScheduleSetting], date: NaiveDate) -> Vec<TimeslotInstance> {
    let active: Vec<&ScheduleSetting> = settings.iter().filter(|s| s.is_active_on(date)).collect();

    // Daily があればその日は Daily のみ
    let effective: Vec<&ScheduleSetting> = if active.iter().any(|s| s.is_daily()) {
        active.into_iter().filter(|s| s.is_daily()).collect()
    } else {
        active
    };

    let mut slots: Vec<TimeslotInstance> = effective
        .into_iter()
        .flat_map(|setting| {
            setting.usable_periods().map(move |period| TimeslotInstance {
                date,
                start_time: period.start_time,
                end_time: period.end_time,
                vacancies: period.vacancies,
                setting_id: setting.id.clone(),
                period_id: period.id.clone(),
            })
        })
        .collect();

    // 安定ソートなので同時刻は設定の並び順を保つ
    slots.sort_by_key(|slot| slot.start_time);
    slots
}

/// 指定月の初日と末日
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// 予約枠を日付ごとにまとめる
pub fn group_by_date(
    slots: impl IntoIterator<Item = TimeslotInstance>,
) -> BTreeMap<NaiveDate, Vec<TimeslotInstance>> {
    let mut days: BTreeMap<NaiveDate, Vec<TimeslotInstance>> = BTreeMap::new();
    for slot in slots {
        days.entry(slot.date).or_default().push(slot);
    }
    days
}

/// 予約済み件数（外部 API から取得）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedCount {
    pub date: NaiveDate,
    pub period_id: String,
    pub count: u32,
}

/// 日付・時間帯ごとの予約済み件数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingTally {
    counts: HashMap<(NaiveDate, String), u32>,
}

impl BookingTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// 予約件数を加算
    pub fn record(&mut self, date: NaiveDate, period_id: impl Into<String>, count: u32) {
        let entry = self.counts.entry((date, period_id.into())).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// 予約済み件数
    pub fn booked(&self, date: NaiveDate, period_id: &str) -> u32 {
        self.counts
            .get(&(date, period_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<BookedCount> for BookingTally {
    fn from_iter<I: IntoIterator<Item = BookedCount>>(iter: I) -> Self {
        let mut tally = Self::new();
        for booked in iter {
            tally.record(booked.date, booked.period_id, booked.count);
        }
        tally
    }
}

/// 予約済み件数を差し引き、満席の枠を除外する
pub fn apply_bookings(slots: Vec<TimeslotInstance>, tally: &BookingTally) -> Vec<TimeslotInstance> {
    if tally.is_empty() {
        return slots;
    }

    slots
        .into_iter()
        .filter_map(|mut slot| {
            let booked = tally.booked(slot.date, &slot.period_id);
            slot.vacancies = slot.vacancies.saturating_sub(booked);
            (slot.vacancies > 0).then_some(slot)
        })
        .collect()
}
