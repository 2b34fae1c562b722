//! エラーハンドリングシステム
//!
//! Talent Hub 編集バッファ全体で使用される統一されたエラー型を定義
//! 寛容API（未知の localId は無視）はエラーを返さない。厳格API・設定読込・送信のみが使う。

use thiserror::Error;

use crate::buffer::LocalId;

/// クレート全体のエラー型
#[derive(Error, Debug, Clone)]
pub enum TalentHubError {
    /// バッファ操作エラー
    #[error("Buffer operation failed: {0}")]
    Buffer(#[from] BufferError),

    /// 送信エラー
    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 入出力エラー（イベントログ等）
    #[error("IO error: {message}")]
    Io { message: String },

    /// シリアライズエラー
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// バッファ操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Edit mode is not active")]
    NotEditing,

    #[error("Local item not found: {local_id}")]
    ItemNotFound { local_id: LocalId },

    #[error("Reorder list omits {} item(s)", .missing.len())]
    IncompleteReorder { missing: Vec<LocalId> },
}

/// 送信先（SubmissionSink）固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Unknown remote item: {id}")]
    UnknownItem { id: String },

    #[error("Instruction for {local_id} has no remote id")]
    MissingRemoteId { local_id: LocalId },

    #[error("Instruction for {local_id} has no fields")]
    MissingFields { local_id: LocalId },

    #[error("Rejected by backend: {reason}")]
    Rejected { reason: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file: {path}")]
    InvalidFile { path: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Info,
    Warning,
    Error,
}

impl TalentHubError {
    /// 表示層向けのレベル分類
    pub fn level(&self) -> ErrorLevel {
        match self {
            TalentHubError::Buffer(BufferError::ItemNotFound { .. }) => ErrorLevel::Warning,
            TalentHubError::Buffer(BufferError::NotEditing) => ErrorLevel::Info,
            TalentHubError::Buffer(BufferError::IncompleteReorder { .. }) => ErrorLevel::Warning,
            _ => ErrorLevel::Error,
        }
    }

    /// 表示層向けメッセージ
    pub fn display_message(&self) -> String {
        match self {
            TalentHubError::Buffer(BufferError::NotEditing) => {
                "編集モードではありません".to_string()
            }
            TalentHubError::Buffer(BufferError::ItemNotFound { local_id }) => {
                format!("質問が見つかりません: {}", local_id)
            }
            TalentHubError::Buffer(BufferError::IncompleteReorder { missing }) => {
                format!("並べ替えに含まれていない質問があります: {}件", missing.len())
            }
            TalentHubError::Submission(SubmissionError::Rejected { reason }) => {
                format!("保存に失敗しました: {}", reason)
            }
            _ => format!("エラーが発生しました: {}", self),
        }
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, TalentHubError>;

/// 各モジュール固有のResult型
pub mod buffer {
    pub type Result<T> = std::result::Result<T, super::BufferError>;
}

pub mod submission {
    pub type Result<T> = std::result::Result<T, super::SubmissionError>;
}

// std::io::Error から TalentHubError への変換
impl From<std::io::Error> for TalentHubError {
    fn from(error: std::io::Error) -> Self {
        TalentHubError::Io {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for TalentHubError {
    fn from(error: serde_json::Error) -> Self {
        TalentHubError::Serialization {
            message: error.to_string(),
        }
    }
}
