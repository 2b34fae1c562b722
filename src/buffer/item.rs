//! バッチ質問（質問とバッチの紐付け）のデータ構造

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::local_id::LocalId;
use super::operation::PendingOperation;

/// サーバー側の紐付けID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// スクリーニング質問のID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// 項目ごとの上書き設定（内容はバッファからは不透明）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemOverrides {
    pub options: Option<Value>,
    pub validation: Option<Value>,
    pub scoring: Option<Value>,
}

/// バッチ質問
///
/// リモートから取得したレコード、および `add_local_item` に渡す下書きの両方に使う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedItem {
    /// 未作成の場合は `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteId>,
    pub question_id: QuestionId,
    pub order: u32,
    pub is_required: bool,
    pub is_active: bool,
    #[serde(default)]
    pub overrides: ItemOverrides,
}

impl LinkedItem {
    /// 新規追加用の項目（必須・有効）
    pub fn new(question_id: impl Into<QuestionId>, order: u32) -> Self {
        Self {
            id: None,
            question_id: question_id.into(),
            order,
            is_required: true,
            is_active: true,
            overrides: ItemOverrides::default(),
        }
    }

    /// リモートIDを付与
    pub fn with_id(mut self, id: impl Into<RemoteId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// パッチを適用し、実際に値が変わったかを返す
    pub fn apply(&mut self, patch: &ItemPatch) -> bool {
        let before = self.clone();
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(is_required) = patch.is_required {
            self.is_required = is_required;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(options) = &patch.options {
            self.overrides.options = options.clone();
        }
        if let Some(validation) = &patch.validation {
            self.overrides.validation = validation.clone();
        }
        if let Some(scoring) = &patch.scoring {
            self.overrides.scoring = scoring.clone();
        }
        *self != before
    }
}

impl From<String> for QuestionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<String> for RemoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// `update_local_item` に渡す部分フィールド
///
/// 上書き設定は `Some(None)` でクリアする。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub order: Option<u32>,
    pub is_required: Option<bool>,
    pub is_active: Option<bool>,
    pub options: Option<Option<Value>>,
    pub validation: Option<Option<Value>>,
    pub scoring: Option<Option<Value>>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = Some(is_required);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn options(mut self, options: Option<Value>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn validation(mut self, validation: Option<Value>) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn scoring(mut self, scoring: Option<Value>) -> Self {
        self.scoring = Some(scoring);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 作業コピー上の項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalItem {
    pub local_id: LocalId,
    pub item: LinkedItem,
    pub operation: PendingOperation,
    /// 編集開始時点のリモート状態（表示用）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<LinkedItem>,
}

impl LocalItem {
    pub fn id(&self) -> Option<&RemoteId> {
        self.item.id.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.operation != PendingOperation::Unchanged
    }

    /// 削除予定でない項目か
    pub fn is_live(&self) -> bool {
        self.operation != PendingOperation::Delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_applies_only_present_fields() {
        let mut item = LinkedItem::new("q1", 1).with_id("a");
        let changed = item.apply(&ItemPatch::new().required(false));

        assert!(changed);
        assert!(!item.is_required);
        assert!(item.is_active);
        assert_eq!(item.order, 1);
        assert_eq!(item.id, Some(RemoteId::from("a")));
    }

    #[test]
    fn patch_can_clear_override() {
        let mut item = LinkedItem::new("q1", 1);
        item.overrides.scoring = Some(json!({ "weight": 2 }));

        item.apply(&ItemPatch::new().scoring(None));
        assert_eq!(item.overrides.scoring, None);
    }

    #[test]
    fn identical_patch_reports_no_change() {
        let mut item = LinkedItem::new("q1", 1);
        assert!(!item.apply(&ItemPatch::new().required(true).active(true)));
        assert!(ItemPatch::new().is_empty());
    }

    #[test]
    fn linked_item_uses_camel_case_on_the_wire() {
        let item = LinkedItem::new("q1", 2).with_id("a").with_required(false);
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["questionId"], json!("q1"));
        assert_eq!(value["isRequired"], json!(false));
        assert_eq!(value["order"], json!(2));
    }

    #[test]
    fn missing_id_is_omitted_and_parsed_back_as_none() {
        let item = LinkedItem::new("q9", 1);
        let text = serde_json::to_string(&item).unwrap();
        assert!(!text.contains("\"id\""));

        let parsed: LinkedItem = serde_json::from_str(
            r#"{"questionId":"q9","order":1,"isRequired":true,"isActive":true}"#,
        )
        .unwrap();
        assert_eq!(parsed, item);
    }
}
