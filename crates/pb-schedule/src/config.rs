//! カレンダーグループ設定ファイル
//!
//! TOML 形式のファイルからカレンダーグループのスケジュールを読み込みます。
//! 日付・時刻は文字列で記述します（例: `"2024-01-01"`, `"09:00"`）。

use pb_core::CalendarGroup;
use std::path::Path;
use tracing::info;

use crate::error::{Result, ScheduleError};

/// TOML ファイルからカレンダーグループを読み込む
pub fn load_calendar_group<P: AsRef<Path>>(path: P) -> Result<CalendarGroup> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        ScheduleError::ConfigLoad(format!("{}: {}", path.display(), e))
    })?;

    let group = parse_calendar_group(&content)?;
    info!(
        path = %path.display(),
        group = %group.name,
        settings = group.settings.len(),
        "カレンダーグループを読み込みました"
    );
    Ok(group)
}

/// TOML 文字列からカレンダーグループを読み込む
pub fn parse_calendar_group(content: &str) -> Result<CalendarGroup> {
    let group: CalendarGroup = toml::from_str(content)?;
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pb_core::{RecurrencePattern, Weekday};
    use std::io::Write;

    const GROUP_TOML: &str = r#"
name = "トリミング"

[[settings]]
days = ["MON", "WED"]

[settings.recurrence]
pattern = "Weekly"
start_date = "2024-01-01"
end_date = "2024-03-01"

[[settings.recurrence.time_periods]]
start_time = "09:00"
end_time = "10:00"
vacancies = 2

[[settings.recurrence.time_periods]]
start_time = "13:00"
end_time = "14:30"
vacancies = 1

[[settings]]
id = "daily-feb"

[settings.recurrence]
pattern = "Daily"
startDate = "2024-02-01"
endDate = "2024-02-10"

[[settings.recurrence.timePeriods]]
startTime = "10:00"
endTime = "11:00"
vacancies = 3
"#;

    #[test]
    fn test_parse_toml() {
        let group = parse_calendar_group(GROUP_TOML).unwrap();
        assert_eq!(group.name, "トリミング");
        assert_eq!(group.settings.len(), 2);

        let weekly = &group.settings[0];
        assert_eq!(weekly.pattern(), RecurrencePattern::Weekly);
        assert!(weekly.days.contains(&Weekday::Wed));
        assert_eq!(weekly.recurrence.time_periods.len(), 2);
        assert_eq!(
            weekly.recurrence.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );

        let daily = &group.settings[1];
        assert_eq!(daily.id, "daily-feb");
        assert!(daily.is_daily());
        assert_eq!(daily.recurrence.time_periods[0].vacancies, 3);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_calendar_group("name = \"x\"\n[[settings]]\ndays = [\"FUNDAY\"]\n");
        assert!(matches!(result, Err(ScheduleError::TomlParse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GROUP_TOML.as_bytes()).unwrap();

        let group = load_calendar_group(file.path()).unwrap();
        assert_eq!(group.settings.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_calendar_group("/nonexistent/calendar_group.toml");
        assert!(matches!(result, Err(ScheduleError::ConfigLoad(_))));
    }
}
