//! エラー型定義 (pb-server)

use thiserror::Error;

/// コマンドライン引数のエラー
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgError {
    #[error("{0} にはファイルパスが必要です")]
    MissingPath(&'static str),

    #[error("{0} には開始日と終了日が必要です")]
    MissingDates(&'static str),

    #[error("日付の形式が不正です (YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("不明な引数: {0}")]
    Unknown(String),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ArgError>;
