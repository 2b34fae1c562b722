//! 保留操作から送信命令への射影

use serde::{Deserialize, Serialize};

use super::item::{LinkedItem, LocalItem, RemoteId};
use super::local_id::LocalId;
use super::operation::PendingOperation;

/// 送信命令の種別（「変更なし」は存在しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

/// 送信先に渡す1件分の命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInstruction {
    pub kind: OperationKind,
    /// 作成命令では常に `None`
    pub item_id: Option<RemoteId>,
    pub local_id: LocalId,
    /// 削除命令では `None`
    pub fields: Option<LinkedItem>,
}

impl SubmissionInstruction {
    /// 作業コピーの項目を命令に変換する。変更なしの項目は `None`。
    pub fn from_local(local: &LocalItem) -> Option<Self> {
        let kind = match local.operation {
            PendingOperation::Unchanged => return None,
            PendingOperation::Create => OperationKind::Create,
            PendingOperation::Update => OperationKind::Update,
            PendingOperation::Delete => OperationKind::Delete,
        };

        let fields = match kind {
            OperationKind::Delete => None,
            _ => {
                let mut fields = local.item.clone();
                fields.id = None;
                Some(fields)
            }
        };

        let item_id = match kind {
            OperationKind::Create => None,
            _ => local.item.id.clone(),
        };

        Some(Self {
            kind,
            item_id,
            local_id: local.local_id.clone(),
            fields,
        })
    }
}

/// 作業コピー全体を命令列に射影（順序は作業コピーの順序）
pub fn project(local_items: &[LocalItem]) -> Vec<SubmissionInstruction> {
    local_items
        .iter()
        .filter_map(SubmissionInstruction::from_local)
        .collect()
}

/// 命令列の集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl OperationSummary {
    pub fn from_instructions(instructions: &[SubmissionInstruction]) -> Self {
        instructions
            .iter()
            .fold(Self::default(), |mut summary, instruction| {
                match instruction.kind {
                    OperationKind::Create => summary.creates += 1,
                    OperationKind::Update => summary.updates += 1,
                    OperationKind::Delete => summary.deletes += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.creates + self.updates + self.deletes
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
