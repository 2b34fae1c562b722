//! talent-hub - バッチ質問編集バッファ
//!
//! Talent Hub 管理画面でバッチに紐付くスクリーニング質問を編集するためのローカルバッファ。
//! リモート一覧を基準に作業コピーを保持し、送信すべき最小の作成・更新・削除命令を導出する。

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// 編集層
pub mod buffer;
pub mod notifier;

// 境界
pub mod snapshot;
pub mod sync;

// 公開API
pub use buffer::{
    EditBufferStore, ItemPatch, LinkedItem, LocalId, OperationKind, PendingOperation,
    SubmissionInstruction,
};
pub use config::{BufferOptionOverrides, BufferOptions, ReorderPolicy};
pub use error::{BufferError, Result, TalentHubError};
pub use notifier::{BufferEvent, BufferObserver};
pub use sync::{commit, CommitOutcome, InMemoryCollection, SubmissionSink};
