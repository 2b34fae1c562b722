//! 表示層向けスナップショット
//!
//! 表示層はストアを直接参照せず、このスナップショットを JSON で受け取ってもよい。

use serde::{Deserialize, Serialize};

use crate::buffer::{
    EditBufferStore, LocalId, LocalItem, OperationSummary, PendingOperation, QuestionId, RemoteId,
};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferSnapshot {
    pub is_editing: bool,
    pub has_pending_changes: bool,
    pub items: Vec<ItemSnapshot>,
    pub selected_questions: Vec<QuestionId>,
    pub has_draft: bool,
    pub summary: OperationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnapshot {
    pub local_id: LocalId,
    pub id: Option<RemoteId>,
    pub question_id: QuestionId,
    pub order: u32,
    pub is_required: bool,
    pub is_active: bool,
    pub operation: PendingOperation,
}

impl From<&LocalItem> for ItemSnapshot {
    fn from(local: &LocalItem) -> Self {
        Self {
            local_id: local.local_id.clone(),
            id: local.item.id.clone(),
            question_id: local.item.question_id.clone(),
            order: local.item.order,
            is_required: local.item.is_required,
            is_active: local.item.is_active,
            operation: local.operation,
        }
    }
}

impl BufferSnapshot {
    pub fn capture(store: &EditBufferStore) -> Self {
        Self {
            is_editing: store.is_editing(),
            has_pending_changes: store.has_pending_changes(),
            items: store.local_items().iter().map(ItemSnapshot::from).collect(),
            selected_questions: store.selection().selected().to_vec(),
            has_draft: store.selection().draft().is_some(),
            summary: store.pending_summary(),
        }
    }

    /// 表示対象（削除予定を除く）の項目
    pub fn visible_items(&self) -> impl Iterator<Item = &ItemSnapshot> {
        self.items
            .iter()
            .filter(|item| item.operation != PendingOperation::Delete)
    }

    /// 有効な質問が1件以上残るか（送信前チェック用）
    pub fn has_active_item(&self) -> bool {
        self.visible_items().any(|item| item.is_active)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 表示層から戻されたJSONを読み込む
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::LinkedItem;

    #[test]
    fn snapshot_reflects_pending_state() {
        let mut store = EditBufferStore::new();
        store.enter_edit_mode(vec![LinkedItem::new("q1", 1).with_id("a")]);
        let a = store.local_items()[0].local_id.clone();
        store.remove_local_item(&a);

        let snapshot = BufferSnapshot::capture(&store);
        assert!(snapshot.is_editing);
        assert!(snapshot.has_pending_changes);
        assert_eq!(snapshot.items[0].operation, PendingOperation::Delete);
        assert_eq!(snapshot.summary.deletes, 1);
        assert_eq!(snapshot.visible_items().count(), 0);
        assert!(!snapshot.has_active_item());
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let mut store = EditBufferStore::new();
        store.enter_edit_mode(vec![LinkedItem::new("q1", 1).with_id("a")]);

        let value = serde_json::to_value(BufferSnapshot::capture(&store)).unwrap();
        assert_eq!(value["isEditing"], true);
        assert_eq!(value["items"][0]["localId"], "remote:a");
        assert_eq!(value["items"][0]["operation"], "none");
    }

    #[test]
    fn malformed_snapshot_json_is_serialization_error() {
        let err = BufferSnapshot::from_json("{\"isEditing\":").unwrap_err();
        assert!(matches!(err, crate::error::TalentHubError::Serialization { .. }));
    }
}
