//! 編集モード外の一時状態（質問の選択と下書き行）

use serde::{Deserialize, Serialize};

use super::item::{LinkedItem, QuestionId};

/// 質問選択と下書きの一時状態
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    /// 選択中の質問（選択順、重複なし）
    selected: Vec<QuestionId>,
    /// 入力途中の行
    draft: Option<LinkedItem>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[QuestionId] {
        &self.selected
    }

    pub fn is_selected(&self, question_id: &QuestionId) -> bool {
        self.selected.contains(question_id)
    }

    /// 選択に追加。既に選択済みなら `false`
    pub fn select(&mut self, question_id: QuestionId) -> bool {
        if self.is_selected(&question_id) {
            return false;
        }
        self.selected.push(question_id);
        true
    }

    /// 選択から外す。未選択なら `false`
    pub fn deselect(&mut self, question_id: &QuestionId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| id != question_id);
        self.selected.len() != before
    }

    /// 選択を反転し、反転後に選択されているかを返す
    pub fn toggle(&mut self, question_id: QuestionId) -> bool {
        if self.deselect(&question_id) {
            false
        } else {
            self.selected.push(question_id);
            true
        }
    }

    pub fn take_selected(&mut self) -> Vec<QuestionId> {
        std::mem::take(&mut self.selected)
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn draft(&self) -> Option<&LinkedItem> {
        self.draft.as_ref()
    }

    pub fn set_draft(&mut self, draft: LinkedItem) {
        self.draft = Some(draft);
    }

    pub fn take_draft(&mut self) -> Option<LinkedItem> {
        self.draft.take()
    }

    /// 下書きを破棄。存在しなければ `false`
    pub fn clear_draft(&mut self) -> bool {
        self.draft.take().is_some()
    }

    /// 未保存の一時状態が無いか
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.draft.is_none()
    }

    pub fn reset(&mut self) {
        self.selected.clear();
        self.draft = None;
    }
}
