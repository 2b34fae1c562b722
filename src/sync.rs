//! 送信先との境界
//!
//! 送信命令の適用は呼び出し側の責務。ここでは送信先のトレイトと、
//! 成功時に新しいスナップショットで編集モードへ入り直す [`commit`] を提供する。

use crate::buffer::{
    EditBufferStore, LinkedItem, OperationKind, OperationSummary, RemoteId, SubmissionInstruction,
};
use crate::error::{submission, BufferError, Result, SubmissionError};

/// 送信先
pub trait SubmissionSink {
    /// 命令列を適用し、最新のリモート一覧を返す
    fn submit(&mut self, instructions: &[SubmissionInstruction]) -> Result<Vec<LinkedItem>>;
}

/// コミット結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// 保留操作が無く、送信しなかった
    NothingToCommit,
    /// 送信成功
    Committed(OperationSummary),
}

/// 保留操作を送信する
///
/// 送信失敗時はバッファを変更せずにエラーを返す（再試行・破棄は呼び出し側が選ぶ）。
pub fn commit(store: &mut EditBufferStore, sink: &mut dyn SubmissionSink) -> Result<CommitOutcome> {
    if !store.is_editing() {
        return Err(BufferError::NotEditing.into());
    }

    let instructions = store.compute_operations();
    if instructions.is_empty() {
        return Ok(CommitOutcome::NothingToCommit);
    }
    let summary = OperationSummary::from_instructions(&instructions);

    let fresh = match sink.submit(&instructions) {
        Ok(items) => items,
        Err(err) => {
            log::warn!("submission of {} instruction(s) failed: {}", summary.total(), err);
            return Err(err);
        }
    };

    log::info!(
        "committed {} create(s), {} update(s), {} delete(s)",
        summary.creates,
        summary.updates,
        summary.deletes
    );
    store.enter_edit_mode(fresh);
    Ok(CommitOutcome::Committed(summary))
}

/// メモリ上のリモート一覧（参照実装・テスト用）
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollection {
    items: Vec<LinkedItem>,
    next_id: u64,
}

impl InMemoryCollection {
    pub fn new(items: Vec<LinkedItem>) -> Self {
        Self { items, next_id: 0 }
    }

    /// `order` 順の一覧
    pub fn items(&self) -> Vec<LinkedItem> {
        let mut items = self.items.clone();
        items.sort_by_key(|item| item.order);
        items
    }

    /// 命令列を順に適用する。途中で失敗した場合は何も適用しない
    pub fn apply(&mut self, instructions: &[SubmissionInstruction]) -> submission::Result<()> {
        let mut working = self.items.clone();
        let mut next_id = self.next_id;

        for instruction in instructions {
            match instruction.kind {
                OperationKind::Create => {
                    let mut fields = required_fields(instruction)?;
                    next_id += 1;
                    fields.id = Some(RemoteId::new(format!("srv-{}", next_id)));
                    working.push(fields);
                }
                OperationKind::Update => {
                    let index = position_of(&working, instruction)?;
                    let mut fields = required_fields(instruction)?;
                    fields.id = working[index].id.clone();
                    working[index] = fields;
                }
                OperationKind::Delete => {
                    let index = position_of(&working, instruction)?;
                    working.remove(index);
                }
            }
        }

        self.items = working;
        self.next_id = next_id;
        Ok(())
    }
}

impl SubmissionSink for InMemoryCollection {
    fn submit(&mut self, instructions: &[SubmissionInstruction]) -> Result<Vec<LinkedItem>> {
        self.apply(instructions)?;
        Ok(self.items())
    }
}

fn required_fields(instruction: &SubmissionInstruction) -> submission::Result<LinkedItem> {
    instruction
        .fields
        .clone()
        .ok_or_else(|| SubmissionError::MissingFields {
            local_id: instruction.local_id.clone(),
        })
}

fn position_of(
    items: &[LinkedItem],
    instruction: &SubmissionInstruction,
) -> submission::Result<usize> {
    let id = instruction
        .item_id
        .as_ref()
        .ok_or_else(|| SubmissionError::MissingRemoteId {
            local_id: instruction.local_id.clone(),
        })?;
    items
        .iter()
        .position(|item| item.id.as_ref() == Some(id))
        .ok_or_else(|| SubmissionError::UnknownItem { id: id.to_string() })
}
