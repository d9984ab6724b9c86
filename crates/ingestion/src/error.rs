//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
///
/// Per-row problems never surface here; they go to the error list.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 表头正则无法编译
    #[error("invalid header pattern: {0}")]
    HeaderPattern(#[from] regex::Error),

    /// 底层读取失败，整个导入中止
    #[error("read_records: {message}")]
    Read {
        /// 错误消息
        message: String,
    },
}

impl IngestionError {
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
