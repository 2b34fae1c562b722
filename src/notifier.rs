//! 変更通知システム
//!
//! 編集バッファの変更イベントを購読者へ配信する。購読者がいなくてもバッファは動作する。

use serde::Serialize;

use crate::buffer::{LocalId, PendingOperation, QuestionId};

/// 購読者の一意識別子
pub type ObserverId = usize;

/// 編集バッファの変更イベント
///
/// 各変更操作は状態遷移の完了後にちょうど1件のイベントを発行する。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BufferEvent {
    /// 編集モード開始
    SessionStarted { item_count: usize },

    /// 編集モード終了（破棄された保留操作数）
    SessionEnded { discarded_changes: usize },

    /// 新規項目の追加
    ItemAdded { local_id: LocalId },

    /// 項目の更新
    ItemUpdated {
        local_id: LocalId,
        operation: PendingOperation,
    },

    /// 項目の削除（`purged` は作業コピーから除去されたか）
    ItemRemoved { local_id: LocalId, purged: bool },

    /// 並べ替え
    ItemsReordered {
        item_count: usize,
        promoted: usize,
        dropped: usize,
    },

    /// 質問選択の変更
    SelectionChanged { selected: Vec<QuestionId> },

    /// 下書きの変更
    DraftChanged { present: bool },

    /// フォーム全体のリセット
    FormReset,
}

impl BufferEvent {
    /// ログ用のタグ
    pub fn tag(&self) -> &'static str {
        match self {
            BufferEvent::SessionStarted { .. } => "session_started",
            BufferEvent::SessionEnded { .. } => "session_ended",
            BufferEvent::ItemAdded { .. } => "item_added",
            BufferEvent::ItemUpdated { .. } => "item_updated",
            BufferEvent::ItemRemoved { .. } => "item_removed",
            BufferEvent::ItemsReordered { .. } => "items_reordered",
            BufferEvent::SelectionChanged { .. } => "selection_changed",
            BufferEvent::DraftChanged { .. } => "draft_changed",
            BufferEvent::FormReset => "form_reset",
        }
    }
}

/// 変更イベントの購読者
pub trait BufferObserver {
    /// 変更イベントを処理
    fn on_event(&mut self, event: &BufferEvent);

    /// 特定のイベント種別のみを処理するかどうか
    fn accepts(&self, event: &BufferEvent) -> bool {
        let _ = event;
        true
    }
}

/// `log` ファサードへ転送する購読者
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl BufferObserver for LogObserver {
    fn on_event(&mut self, event: &BufferEvent) {
        log::debug!("edit buffer event: {:?}", event);
    }
}

/// 配信統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifierStats {
    pub observers: usize,
    pub events_dispatched: usize,
}

/// 購読者レジストリ
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<(ObserverId, Box<dyn BufferObserver>)>,
    next_id: ObserverId,
    events_dispatched: usize,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 購読者を登録
    pub fn subscribe(&mut self, observer: Box<dyn BufferObserver>) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// 購読解除。登録されていなければ `false`
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// イベントを全購読者へ配信
    pub fn emit(&mut self, event: BufferEvent) {
        self.events_dispatched += 1;
        for (_, observer) in self.observers.iter_mut() {
            if observer.accepts(&event) {
                observer.on_event(&event);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn stats(&self) -> NotifierStats {
        NotifierStats {
            observers: self.observers.len(),
            events_dispatched: self.events_dispatched,
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .field("events_dispatched", &self.events_dispatched)
            .finish()
    }
}
