//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. petbook.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::Error;

/// Main configuration for petbook
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Scheduling rules
    #[serde(default)]
    pub schedule: ScheduleRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key for HTTP API authentication
    pub key: Option<String>,

    /// Port for HTTP API server
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Allowed CORS origins (e.g., ["http://localhost:3000", "https://example.com"])
    /// If empty, any origin is allowed
    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            port: default_api_port(),
            allowed_origins: None,
        }
    }
}

/// Scheduling rules shared by validation and materialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRules {
    /// How far ahead (in calendar months) a setting's end date may reach
    #[serde(default = "default_booking_horizon_months")]
    pub booking_horizon_months: u32,

    /// Offset of the business's wall clock from UTC, in minutes
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Longest date range a single timeslot query may cover
    #[serde(default = "default_max_query_days")]
    pub max_query_days: u32,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            booking_horizon_months: default_booking_horizon_months(),
            utc_offset_minutes: 0,
            max_query_days: default_max_query_days(),
        }
    }
}

impl ScheduleRules {
    /// UTC offset of the business's wall clock
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
    }

    /// Current wall-clock date-time
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset()).naive_local()
    }

    /// Current wall-clock date
    pub fn today(&self) -> NaiveDate {
        self.local_now().date()
    }
}

fn default_api_port() -> u16 {
    3000
}

fn default_booking_horizon_months() -> u32 {
    3
}

fn default_max_query_days() -> u32 {
    93
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// # 引数
    /// * `path` - TOML ファイルのパス
    ///
    /// # 環境変数展開
    /// 設定ファイル内の `${VAR_NAME}` は環境変数の値に置換されます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)?;

        let mut cfg = Self::from_toml_str(&toml_content)?;

        // 既存の環境変数で上書き（環境変数が優先）
        cfg.apply_env_overrides();
        cfg.validate()?;

        Ok(cfg)
    }

    /// TOML 文字列から設定を構築（環境変数の上書きなし）
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded_content = Self::expand_env_vars(content);

        let toml: TomlConfig = toml::from_str(&expanded_content)?;

        Ok(Self::from_toml_config(toml))
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// 以下の順序で設定を探します:
    /// 1. `./petbook.toml`
    /// 2. 見つからない場合はデフォルト値 + 環境変数
    pub fn load() -> crate::Result<Self> {
        if Path::new("petbook.toml").exists() {
            info!("Loading configuration from petbook.toml");
            return Self::from_toml_file("petbook.toml");
        }

        info!("petbook.toml not found, using defaults and environment");
        Self::from_env()
    }

    /// Load configuration from defaults and environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the scheduling code cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.schedule.booking_horizon_months == 0 {
            return Err(Error::Config(
                "booking_horizon_months must be at least 1".to_string(),
            ));
        }
        if self.schedule.max_query_days == 0 {
            return Err(Error::Config("max_query_days must be at least 1".to_string()));
        }
        if FixedOffset::east_opt(self.schedule.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Err(Error::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.schedule.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// TOML 構造から Config を構築
    fn from_toml_config(toml: TomlConfig) -> Self {
        let api = toml.api.unwrap_or_default();
        let api_config = ApiConfig {
            key: api.key.filter(|k| !k.is_empty()),
            port: api.port.unwrap_or_else(default_api_port),
            allowed_origins: api.allowed_origins,
        };

        let schedule = toml.schedule.unwrap_or_default();
        let schedule_rules = ScheduleRules {
            booking_horizon_months: schedule
                .booking_horizon_months
                .unwrap_or_else(default_booking_horizon_months),
            utc_offset_minutes: schedule.utc_offset_minutes.unwrap_or(0),
            max_query_days: schedule.max_query_days.unwrap_or_else(default_max_query_days),
        };

        Config {
            api: api_config,
            schedule: schedule_rules,
        }
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        // API 設定の上書き
        if let Ok(key) = std::env::var("API_KEY") {
            if !key.is_empty() {
                self.api.key = Some(key);
            }
        }
        if let Ok(port) = std::env::var("API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Ok(origins) = std::env::var("API_ALLOWED_ORIGINS") {
            self.api.allowed_origins = Some(
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }

        // スケジュール設定の上書き
        if let Ok(months) = std::env::var("BOOKING_HORIZON_MONTHS") {
            if let Ok(m) = months.parse() {
                self.schedule.booking_horizon_months = m;
            }
        }
        if let Ok(offset) = std::env::var("SCHEDULE_UTC_OFFSET_MINUTES") {
            if let Ok(o) = offset.parse() {
                self.schedule.utc_offset_minutes = o;
            }
        }
        if let Ok(days) = std::env::var("MAX_QUERY_DAYS") {
            if let Ok(d) = days.parse() {
                self.schedule.max_query_days = d;
            }
        }
    }
}

// ============================================================================
// TOML 構造体定義（ファイル解析用）
// ============================================================================

/// TOML ファイル用のトップレベル構造
#[derive(Debug, Deserialize)]
struct TomlConfig {
    /// HTTP API 設定
    api: Option<TomlApiConfig>,
    /// スケジュール設定
    schedule: Option<TomlScheduleConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlApiConfig {
    /// API キー (オプション)
    #[serde(default)]
    key: Option<String>,
    /// ポート番号
    #[serde(default)]
    port: Option<u16>,
    /// 許可する CORS オリジン
    #[serde(default)]
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlScheduleConfig {
    /// 予約可能期間（月数）
    #[serde(default)]
    booking_horizon_months: Option<u32>,
    /// UTC からのオフセット（分）
    #[serde(default)]
    utc_offset_minutes: Option<i32>,
    /// 1 回の空き枠検索で指定できる最大日数
    #[serde(default)]
    max_query_days: Option<u32>,
}
