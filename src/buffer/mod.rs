//! バッチ質問の編集バッファ
//!
//! 作業コピー・保留操作・差分導出

pub mod diff;
pub mod item;
pub mod local_id;
pub mod operation;
pub mod selection;
pub mod store;

pub use diff::{OperationKind, OperationSummary, SubmissionInstruction};
pub use item::{ItemOverrides, ItemPatch, LinkedItem, LocalItem, QuestionId, RemoteId};
pub use local_id::{LocalId, LocalIdAllocator};
pub use operation::{next_operation, ItemAction, PendingOperation, Transition};
pub use selection::SelectionState;
pub use store::{EditBufferStore, EditSession};
