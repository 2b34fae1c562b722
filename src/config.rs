//! 編集バッファの設定

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// 並べ替え時にIDリストから漏れた項目の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderPolicy {
    /// 作業コピーから取り除く
    #[default]
    DropMissing,
    /// 相対順序を保って末尾に付け足す
    AppendMissing,
    /// エラーを返し、バッファは変更しない
    Reject,
}

/// バッファ制御のオプション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferOptions {
    pub reorder_policy: ReorderPolicy,
    /// 編集開始時点のリモート状態を各項目に保持するか
    pub keep_original_snapshot: bool,
    /// イベントログ出力先（未指定時は記録しない）
    pub event_log_path: Option<PathBuf>,
    /// イベントを `log` ファサードへ転送するか
    pub log_events: bool,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            reorder_policy: ReorderPolicy::default(),
            keep_original_snapshot: true,
            event_log_path: None,
            log_events: false,
        }
    }
}

/// 上書き用のオプション（未指定の項目は基準値を維持）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferOptionOverrides {
    pub reorder_policy: Option<ReorderPolicy>,
    pub keep_original_snapshot: Option<bool>,
    pub event_log_path: Option<PathBuf>,
    pub log_events: Option<bool>,
}

impl BufferOptionOverrides {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| {
            ConfigError::InvalidValue {
                key: "buffer_option_overrides".to_string(),
                value: err.to_string(),
            }
            .into()
        })
    }
}

impl BufferOptions {
    pub fn with_reorder_policy(mut self, policy: ReorderPolicy) -> Self {
        self.reorder_policy = policy;
        self
    }

    pub fn with_event_log<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.event_log_path = Some(path.into());
        self
    }

    /// 既定の出力先（`~/.talent-hub-log/edit-buffer.jsonl`）でイベントログを有効化
    pub fn with_default_event_log(mut self) -> Self {
        self.event_log_path = self.resolve_event_log_path();
        self
    }

    /// JSON文字列から読み込む。省略したキーは既定値
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| {
            ConfigError::InvalidValue {
                key: "buffer_options".to_string(),
                value: err.to_string(),
            }
            .into()
        })
    }

    /// 設定ファイルから読み込む
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::InvalidFile {
            path: path.display().to_string(),
        })?;
        Self::from_json_str(&text)
    }

    /// イベントログ出力先。未指定なら既定のパス
    pub fn resolve_event_log_path(&self) -> Option<PathBuf> {
        match &self.event_log_path {
            Some(path) => Some(path.clone()),
            None => default_event_log_path(),
        }
    }

    /// `overrides` で指定された値を優先して統合
    pub fn merged_with(&self, overrides: &BufferOptionOverrides) -> BufferOptions {
        BufferOptions {
            reorder_policy: overrides.reorder_policy.unwrap_or(self.reorder_policy),
            keep_original_snapshot: overrides
                .keep_original_snapshot
                .unwrap_or(self.keep_original_snapshot),
            event_log_path: overrides
                .event_log_path
                .clone()
                .or_else(|| self.event_log_path.clone()),
            log_events: overrides.log_events.unwrap_or(self.log_events),
        }
    }
}

fn default_event_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".talent-hub-log").join("edit-buffer.jsonl"))
}

/// ヘルパー：親ディレクトリを作成
pub(crate) fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
