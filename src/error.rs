// 错误类型
// 所有外部协作方（托管后端、本地数据库、配置文件）的失败都汇总到 AppError

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// 托管后端返回的错误信息，原样展示给用户
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Solve not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
