//! イベントログ
//!
//! 編集バッファのイベントを JSON Lines 形式でファイルへ記録する購読者。
//! 書き込み失敗はバッファの状態に影響させず、`log` へ警告を出すのみ。

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::ensure_parent_dir;
use crate::notifier::{BufferEvent, BufferObserver};

/// JSON Lines 形式のイベントレコーダー
#[derive(Debug)]
pub struct EventLogRecorder {
    file: File,
    path: PathBuf,
    written: usize,
}

impl EventLogRecorder {
    /// 追記モードで開く
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 書き込んだレコード数
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn log_event<T: Serialize>(&mut self, tag: &str, payload: &T) -> io::Result<()> {
        let record = serde_json::json!({
            "tag": tag,
            "ts": timestamp_ms(),
            "payload": payload
        });
        let line = serde_json::to_string(&record)?;
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        self.written += 1;
        Ok(())
    }
}

impl BufferObserver for EventLogRecorder {
    fn on_event(&mut self, event: &BufferEvent) {
        if let Err(err) = self.log_event(event.tag(), event) {
            log::warn!(
                "failed to write edit buffer event to {}: {}",
                self.path.display(),
                err
            );
        }
    }
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_millis())
        .unwrap_or_default()
}
