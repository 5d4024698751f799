//! エラー型定義 (pb-schedule)

use thiserror::Error;

/// pb-schedule のエラー型
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("設定ファイル読み込みエラー: {0}")]
    ConfigLoad(String),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("スケジュール設定が 1 件もありません")]
    EmptySchedule,

    #[error("最後のスケジュール設定は削除できません")]
    LastSetting,

    #[error("スケジュール設定 {0} の最後の時間帯は削除できません")]
    LastTimePeriod(usize),

    #[error("スケジュール設定が見つかりません: index {0}")]
    SettingNotFound(usize),

    #[error("時間帯が見つかりません: setting {setting}, period {period}")]
    TimePeriodNotFound { setting: usize, period: usize },
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ScheduleError>;
