//! 編集中のスケジュール
//!
//! 編集操作はすべて新しい `ScheduleDraft` を返し、元の値は変更しません。
//! 設定は最低 1 件、各設定の時間帯も最低 1 件を保ちます。

use pb_core::{ScheduleSetting, TimePeriod};

use crate::conflict::{ScheduleConflict, detect_conflict};
use crate::error::{Result, ScheduleError};

/// 送信前のスケジュール設定一式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    settings: Vec<ScheduleSetting>,
}

impl ScheduleDraft {
    /// 最初の設定から作成
    pub fn new(first: ScheduleSetting) -> Self {
        Self {
            settings: vec![first],
        }
    }

    /// 既存の設定一覧から作成（空は不可）
    pub fn from_settings(settings: Vec<ScheduleSetting>) -> Result<Self> {
        if settings.is_empty() {
            return Err(ScheduleError::EmptySchedule);
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &[ScheduleSetting] {
        &self.settings
    }

    pub fn into_settings(self) -> Vec<ScheduleSetting> {
        self.settings
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// 常に false（設定は最低 1 件）
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// 設定を末尾に追加
    pub fn with_setting(&self, setting: ScheduleSetting) -> Self {
        let mut settings = self.settings.clone();
        settings.push(setting);
        Self { settings }
    }

    /// 設定を削除
    pub fn without_setting(&self, index: usize) -> Result<Self> {
        self.check_setting(index)?;
        if self.settings.len() == 1 {
            return Err(ScheduleError::LastSetting);
        }

        let mut settings = self.settings.clone();
        settings.remove(index);
        Ok(Self { settings })
    }

    /// 設定を置き換え
    pub fn with_setting_replaced(&self, index: usize, setting: ScheduleSetting) -> Result<Self> {
        self.check_setting(index)?;

        let mut settings = self.settings.clone();
        settings[index] = setting;
        Ok(Self { settings })
    }

    /// 設定に時間帯を追加
    pub fn with_time_period(&self, index: usize, period: TimePeriod) -> Result<Self> {
        self.update_periods(index, |periods| {
            periods.push(period);
            Ok(())
        })
    }

    /// 設定から時間帯を削除
    pub fn without_time_period(&self, index: usize, period_index: usize) -> Result<Self> {
        self.update_periods(index, |periods| {
            if period_index >= periods.len() {
                return Err(ScheduleError::TimePeriodNotFound {
                    setting: index,
                    period: period_index,
                });
            }
            if periods.len() == 1 {
                return Err(ScheduleError::LastTimePeriod(index));
            }
            periods.remove(period_index);
            Ok(())
        })
    }

    /// 時間帯を置き換え
    pub fn with_time_period_replaced(
        &self,
        index: usize,
        period_index: usize,
        period: TimePeriod,
    ) -> Result<Self> {
        self.update_periods(index, |periods| {
            let slot = periods
                .get_mut(period_index)
                .ok_or(ScheduleError::TimePeriodNotFound {
                    setting: index,
                    period: period_index,
                })?;
            *slot = period;
            Ok(())
        })
    }

    /// 現在の設定で競合を検出
    pub fn conflict(&self) -> Option<ScheduleConflict> {
        detect_conflict(&self.settings)
    }

    fn check_setting(&self, index: usize) -> Result<()> {
        if index >= self.settings.len() {
            return Err(ScheduleError::SettingNotFound(index));
        }
        Ok(())
    }

    fn update_periods<F>(&self, index: usize, update: F) -> Result<Self>
    where
        F: FnOnce(&mut Vec<TimePeriod>) -> Result<()>,
    {
        self.check_setting(index)?;

        let mut settings = self.settings.clone();
        update(&mut settings[index].recurrence.time_periods)?;
        Ok(Self { settings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use pb_core::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: u32, end: u32) -> TimePeriod {
        TimePeriod::new(
            NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
            1,
        )
    }

    fn monday_setting() -> ScheduleSetting {
        ScheduleSetting::weekly(
            [Weekday::Mon],
            date(2024, 1, 1),
            date(2024, 3, 1),
            vec![period(9, 10)],
        )
    }

    #[test]
    fn test_from_settings_rejects_empty() {
        assert!(matches!(
            ScheduleDraft::from_settings(vec![]),
            Err(ScheduleError::EmptySchedule)
        ));
    }

    #[test]
    fn test_add_and_remove_setting() {
        let draft = ScheduleDraft::new(monday_setting());
        let added = draft.with_setting(monday_setting());

        // 元の値は変わらない
        assert_eq!(draft.len(), 1);
        assert_eq!(added.len(), 2);

        let removed = added.without_setting(0).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed.settings()[0].id, added.settings()[1].id);
    }

    #[test]
    fn test_cannot_remove_last_setting() {
        let draft = ScheduleDraft::new(monday_setting());
        assert!(matches!(draft.without_setting(0), Err(ScheduleError::LastSetting)));
        assert!(matches!(
            draft.without_setting(3),
            Err(ScheduleError::SettingNotFound(3))
        ));
    }

    #[test]
    fn test_time_period_operations() {
        let draft = ScheduleDraft::new(monday_setting());

        let with_two = draft.with_time_period(0, period(13, 14)).unwrap();
        assert_eq!(with_two.settings()[0].recurrence.time_periods.len(), 2);
        assert_eq!(draft.settings()[0].recurrence.time_periods.len(), 1);

        let replaced = with_two.with_time_period_replaced(0, 1, period(15, 16)).unwrap();
        assert_eq!(
            replaced.settings()[0].recurrence.time_periods[1].start_time,
            NaiveTime::from_hms_opt(15, 0, 0).unwrap()
        );

        let back_to_one = replaced.without_time_period(0, 0).unwrap();
        assert_eq!(back_to_one.settings()[0].recurrence.time_periods.len(), 1);

        assert!(matches!(
            back_to_one.without_time_period(0, 0),
            Err(ScheduleError::LastTimePeriod(0))
        ));
        assert!(matches!(
            back_to_one.with_time_period_replaced(0, 4, period(9, 10)),
            Err(ScheduleError::TimePeriodNotFound { setting: 0, period: 4 })
        ));
        assert!(matches!(
            back_to_one.with_time_period(2, period(9, 10)),
            Err(ScheduleError::SettingNotFound(2))
        ));
    }

    #[test]
    fn test_conflict_after_edit() {
        let draft = ScheduleDraft::new(monday_setting());
        assert!(draft.conflict().is_none());

        let clashing = draft.with_setting(monday_setting());
        let conflict = clashing.conflict().unwrap();
        assert_eq!((conflict.index_a, conflict.index_b), (0, 1));

        // 時間帯をずらせば解消
        let fixed = clashing.with_time_period_replaced(1, 0, period(10, 11)).unwrap();
        assert!(fixed.conflict().is_none());
    }
}
