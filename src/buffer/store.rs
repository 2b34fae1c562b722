//! 編集バッファストア
//!
//! リモートから取得したバッチ質問一覧を基準（ベースライン）として保持し、
//! 操作タグ付きの作業コピーに対するユーザー操作を記録する。
//! 送信すべき最小の作成・更新・削除命令は [`EditBufferStore::compute_operations`] で導出する。
//!
//! ストアは画面ごとに生成して所有する。送信の成否は知らないため、
//! 呼び出し側は送信成功後に新しいスナップショットで編集モードに入り直す。

use std::collections::{HashMap, HashSet};

use super::diff::{self, OperationSummary, SubmissionInstruction};
use super::item::{ItemPatch, LinkedItem, LocalItem, QuestionId};
use super::local_id::{LocalId, LocalIdAllocator};
use super::operation::{next_operation, ItemAction, PendingOperation, Transition};
use super::selection::SelectionState;
use crate::config::{BufferOptions, ReorderPolicy};
use crate::error::{buffer, BufferError, Result};
use crate::logging::EventLogRecorder;
use crate::notifier::{
    BufferEvent, BufferObserver, LogObserver, NotifierStats, ObserverId, ObserverRegistry,
};

/// 1回の編集セッション
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSession {
    /// ベースライン。セッション中は変更しない
    remote_items: Vec<LinkedItem>,
    /// 作業コピー
    local_items: Vec<LocalItem>,
}

impl EditSession {
    fn index_of(&self, local_id: &LocalId) -> Option<usize> {
        self.local_items
            .iter()
            .position(|local| &local.local_id == local_id)
    }

    fn pending_count(&self) -> usize {
        self.local_items.iter().filter(|local| local.is_pending()).count()
    }
}

/// バッチ質問の編集バッファ
#[derive(Debug, Default)]
pub struct EditBufferStore {
    options: BufferOptions,
    session: Option<EditSession>,
    selection: SelectionState,
    ids: LocalIdAllocator,
    observers: ObserverRegistry,
}

impl EditBufferStore {
    /// 既定設定で作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定付きで作成。イベントログ出力先があればレコーダーを登録する
    pub fn with_options(options: BufferOptions) -> Result<Self> {
        let mut store = Self {
            options,
            ..Self::default()
        };
        if let Some(path) = store.options.event_log_path.clone() {
            let recorder = EventLogRecorder::open(&path)?;
            store.subscribe(Box::new(recorder));
        }
        if store.options.log_events {
            store.subscribe(Box::new(LogObserver));
        }
        Ok(store)
    }

    pub fn options(&self) -> &BufferOptions {
        &self.options
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// ベースライン（編集モード外では空）
    pub fn remote_items(&self) -> &[LinkedItem] {
        self.session
            .as_ref()
            .map(|session| session.remote_items.as_slice())
            .unwrap_or(&[])
    }

    /// 作業コピー（編集モード外では空）
    pub fn local_items(&self) -> &[LocalItem] {
        self.session
            .as_ref()
            .map(|session| session.local_items.as_slice())
            .unwrap_or(&[])
    }

    pub fn local_item(&self, local_id: &LocalId) -> Option<&LocalItem> {
        self.local_items()
            .iter()
            .find(|local| &local.local_id == local_id)
    }

    pub fn operation_of(&self, local_id: &LocalId) -> Option<PendingOperation> {
        self.local_item(local_id).map(|local| local.operation)
    }

    /// 編集モードに入る
    ///
    /// 既存セッションは上書きされる。各リモート項目は `none` として作業コピーに複製する。
    pub fn enter_edit_mode(&mut self, remote_items: Vec<LinkedItem>) {
        self.ids.begin_session();
        let keep_original = self.options.keep_original_snapshot;

        let mut local_items = Vec::with_capacity(remote_items.len());
        for (position, item) in remote_items.iter().enumerate() {
            local_items.push(LocalItem {
                local_id: self.ids.for_remote(item.id.as_ref(), position),
                item: item.clone(),
                operation: PendingOperation::Unchanged,
                original: keep_original.then(|| item.clone()),
            });
        }

        let item_count = local_items.len();
        if let Some(previous) = self.session.as_ref() {
            log::debug!(
                "re-entering edit mode, discarding {} pending change(s)",
                previous.pending_count()
            );
        }
        self.session = Some(EditSession {
            remote_items,
            local_items,
        });
        log::debug!("entered edit mode with {} item(s)", item_count);
        self.observers.emit(BufferEvent::SessionStarted { item_count });
    }

    /// 編集モードを抜ける。未保存の変更は破棄される
    pub fn exit_edit_mode(&mut self) {
        let discarded_changes = self
            .session
            .take()
            .map(|session| session.pending_count())
            .unwrap_or(0);
        if discarded_changes > 0 {
            log::info!("discarded {} unsaved change(s)", discarded_changes);
        }
        self.observers
            .emit(BufferEvent::SessionEnded { discarded_changes });
    }

    /// 新規項目を末尾に追加し、採番した localId を返す
    ///
    /// 編集モード外では何もせず `None`。渡された項目のリモートIDは破棄する。
    pub fn add_local_item(&mut self, mut item: LinkedItem) -> Option<LocalId> {
        let Some(session) = self.session.as_mut() else {
            log::debug!("add_local_item ignored outside edit mode");
            return None;
        };
        if let Some(id) = item.id.take() {
            log::warn!("new item carried remote id {}; dropped", id);
        }

        let local_id = self.ids.for_new();
        session.local_items.push(LocalItem {
            local_id: local_id.clone(),
            item,
            operation: PendingOperation::Create,
            original: None,
        });
        self.observers.emit(BufferEvent::ItemAdded {
            local_id: local_id.clone(),
        });
        Some(local_id)
    }

    /// 部分フィールドを統合する。対象が無ければ何もしない
    pub fn update_local_item(&mut self, local_id: &LocalId, patch: ItemPatch) {
        if let Err(err) = self.try_update_local_item(local_id, patch) {
            log::debug!("update_local_item ignored: {}", err);
        }
    }

    /// [`update_local_item`](Self::update_local_item) の厳格版。遷移後の操作を返す
    pub fn try_update_local_item(
        &mut self,
        local_id: &LocalId,
        patch: ItemPatch,
    ) -> buffer::Result<PendingOperation> {
        let session = self.session.as_mut().ok_or(BufferError::NotEditing)?;
        let local = session
            .local_items
            .iter_mut()
            .find(|local| &local.local_id == local_id)
            .ok_or_else(|| BufferError::ItemNotFound {
                local_id: local_id.clone(),
            })?;

        if !local.item.apply(&patch) {
            log::debug!("patch for {} did not change any field", local_id);
        }
        if let Transition::Tag(operation) = next_operation(local.operation, ItemAction::Update) {
            local.operation = operation;
        }
        let operation = local.operation;

        self.observers.emit(BufferEvent::ItemUpdated {
            local_id: local_id.clone(),
            operation,
        });
        Ok(operation)
    }

    /// 項目を削除する。未作成項目は作業コピーから取り除き、それ以外は削除予定にする
    pub fn remove_local_item(&mut self, local_id: &LocalId) {
        if let Err(err) = self.try_remove_local_item(local_id) {
            log::debug!("remove_local_item ignored: {}", err);
        }
    }

    /// [`remove_local_item`](Self::remove_local_item) の厳格版。取り除いた場合 `true`
    pub fn try_remove_local_item(&mut self, local_id: &LocalId) -> buffer::Result<bool> {
        let session = self.session.as_mut().ok_or(BufferError::NotEditing)?;
        let index = session
            .index_of(local_id)
            .ok_or_else(|| BufferError::ItemNotFound {
                local_id: local_id.clone(),
            })?;

        let purged = match next_operation(session.local_items[index].operation, ItemAction::Remove)
        {
            Transition::Purge => {
                session.local_items.remove(index);
                true
            }
            Transition::Tag(operation) => {
                session.local_items[index].operation = operation;
                false
            }
        };

        self.observers.emit(BufferEvent::ItemRemoved {
            local_id: local_id.clone(),
            purged,
        });
        Ok(purged)
    }

    /// 指定順に並べ替え、`order` を1始まりの連番で振り直す
    ///
    /// リスト中の未知のIDは無視し、重複は最初の位置を採用する。
    /// リストから漏れた項目は [`ReorderPolicy`] に従う。
    pub fn reorder_local_items(&mut self, ordered_local_ids: &[LocalId]) -> Result<()> {
        let policy = self.options.reorder_policy;
        let Some(session) = self.session.as_mut() else {
            log::debug!("reorder_local_items ignored outside edit mode");
            return Ok(());
        };

        let (listed, missing) = {
            let positions: HashMap<&LocalId, usize> = session
                .local_items
                .iter()
                .enumerate()
                .map(|(index, local)| (&local.local_id, index))
                .collect();
            let mut seen = HashSet::new();
            let listed: Vec<usize> = ordered_local_ids
                .iter()
                .filter_map(|local_id| positions.get(local_id).copied())
                .filter(|index| seen.insert(*index))
                .collect();
            let missing: Vec<usize> = (0..session.local_items.len())
                .filter(|index| !seen.contains(index))
                .collect();
            (listed, missing)
        };

        if !missing.is_empty() {
            match policy {
                ReorderPolicy::Reject => {
                    let missing = missing
                        .iter()
                        .map(|&index| session.local_items[index].local_id.clone())
                        .collect();
                    return Err(BufferError::IncompleteReorder { missing }.into());
                }
                ReorderPolicy::DropMissing => {
                    log::warn!("reorder dropped {} unlisted item(s)", missing.len());
                }
                ReorderPolicy::AppendMissing => {
                    log::debug!("reorder appended {} unlisted item(s)", missing.len());
                }
            }
        }

        let mut sequence = listed;
        if policy == ReorderPolicy::AppendMissing {
            sequence.extend(missing);
        }

        let total = session.local_items.len();
        let mut previous: Vec<Option<LocalItem>> = std::mem::take(&mut session.local_items)
            .into_iter()
            .map(Some)
            .collect();
        let mut promoted = 0;

        for (position, index) in sequence.into_iter().enumerate() {
            let Some(mut local) = previous[index].take() else {
                continue;
            };
            let new_order = position as u32 + 1;
            let moved = local.item.order != new_order;
            local.item.order = new_order;

            match next_operation(local.operation, ItemAction::Reorder { moved }) {
                Transition::Tag(operation) => {
                    if local.operation == PendingOperation::Unchanged
                        && operation == PendingOperation::Update
                    {
                        promoted += 1;
                    }
                    local.operation = operation;
                }
                Transition::Purge => continue,
            }
            session.local_items.push(local);
        }

        let item_count = session.local_items.len();
        self.observers.emit(BufferEvent::ItemsReordered {
            item_count,
            promoted,
            dropped: total - item_count,
        });
        Ok(())
    }

    /// 未保存の変更があるか
    ///
    /// 編集モード中は保留操作の有無、それ以外は選択・下書きの有無で判定する。
    pub fn has_pending_changes(&self) -> bool {
        match &self.session {
            Some(session) => session.local_items.iter().any(LocalItem::is_pending),
            None => !self.selection.is_empty(),
        }
    }

    /// 送信命令を導出する（状態は変更しない）
    pub fn compute_operations(&self) -> Vec<SubmissionInstruction> {
        diff::project(self.local_items())
    }

    pub fn pending_summary(&self) -> OperationSummary {
        OperationSummary::from_instructions(&self.compute_operations())
    }

    /// セッションと一時状態をすべて初期状態に戻す
    pub fn reset_form(&mut self) {
        self.session = None;
        self.selection.reset();
        self.observers.emit(BufferEvent::FormReset);
    }

    // ========================
    // 一時状態（質問選択と下書き）
    // ========================

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn select_question(&mut self, question_id: QuestionId) {
        if self.selection.select(question_id) {
            self.emit_selection();
        }
    }

    pub fn deselect_question(&mut self, question_id: &QuestionId) {
        if self.selection.deselect(question_id) {
            self.emit_selection();
        }
    }

    pub fn toggle_question(&mut self, question_id: QuestionId) -> bool {
        let selected = self.selection.toggle(question_id);
        self.emit_selection();
        selected
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
        self.emit_selection();
    }

    pub fn set_draft(&mut self, draft: LinkedItem) {
        self.selection.set_draft(draft);
        self.observers.emit(BufferEvent::DraftChanged { present: true });
    }

    pub fn take_draft(&mut self) -> Option<LinkedItem> {
        let draft = self.selection.take_draft();
        if draft.is_some() {
            self.observers.emit(BufferEvent::DraftChanged { present: false });
        }
        draft
    }

    pub fn clear_draft(&mut self) {
        if self.selection.clear_draft() {
            self.observers.emit(BufferEvent::DraftChanged { present: false });
        }
    }

    /// 選択中の質問を新規項目として末尾に追加し、選択を解除する
    ///
    /// 削除予定でない項目が既に紐付けている質問は追加しない。編集モード外では何もしない。
    pub fn add_selected_questions(&mut self) -> Vec<LocalId> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let linked: HashSet<QuestionId> = session
            .local_items
            .iter()
            .filter(|local| local.is_live())
            .map(|local| local.item.question_id.clone())
            .collect();
        let mut next_order = session
            .local_items
            .iter()
            .map(|local| local.item.order)
            .max()
            .unwrap_or(0);

        let mut added = Vec::new();
        for question_id in self.selection.take_selected() {
            if linked.contains(&question_id) {
                log::debug!("question {} is already linked; skipped", question_id);
                continue;
            }
            let Some(order) = next_order.checked_add(1) else {
                log::warn!("order value exhausted; question {} was not added", question_id);
                continue;
            };
            next_order = order;
            if let Some(local_id) = self.add_local_item(LinkedItem::new(question_id, order)) {
                added.push(local_id);
            }
        }
        self.emit_selection();
        added
    }

    fn emit_selection(&mut self) {
        let selected = self.selection.selected().to_vec();
        self.observers
            .emit(BufferEvent::SelectionChanged { selected });
    }

    // ========================
    // 購読
    // ========================

    pub fn subscribe(&mut self, observer: Box<dyn BufferObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn notifier_stats(&self) -> NotifierStats {
        self.observers.stats()
    }
}
