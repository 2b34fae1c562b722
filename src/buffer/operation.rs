//! 項目ごとの保留操作と状態遷移
//!
//! 遷移表は純粋関数 [`next_operation`] に集約し、コレクション操作から切り離して検証する。

use serde::{Deserialize, Serialize};

/// リモート状態に対する保留中の変更
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOperation {
    /// 変更なし
    #[default]
    #[serde(rename = "none")]
    Unchanged,
    Create,
    Update,
    Delete,
}

impl PendingOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "none",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// 項目に対するユーザー操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    /// 部分フィールドの更新
    Update,
    /// 並べ替え（`moved` は表示位置が変わったか）
    Reorder { moved: bool },
    /// 削除
    Remove,
}

/// 遷移結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 指定の操作で保持
    Tag(PendingOperation),
    /// コレクションから除去（未作成項目の削除）
    Purge,
}

/// 状態遷移関数
pub fn next_operation(current: PendingOperation, action: ItemAction) -> Transition {
    use ItemAction as A;
    use PendingOperation as P;

    match (current, action) {
        (P::Create, A::Remove) => Transition::Purge,
        (P::Create, A::Update) | (P::Create, A::Reorder { .. }) => Transition::Tag(P::Create),

        (P::Unchanged, A::Reorder { moved: false }) => Transition::Tag(P::Unchanged),
        (P::Unchanged, A::Update) | (P::Unchanged, A::Reorder { moved: true }) => {
            Transition::Tag(P::Update)
        }

        (P::Update, A::Update) | (P::Update, A::Reorder { .. }) => Transition::Tag(P::Update),

        // 編集による削除予定の取り消し
        (P::Delete, A::Update) => Transition::Tag(P::Update),
        (P::Delete, A::Reorder { .. }) => Transition::Tag(P::Delete),

        (P::Unchanged, A::Remove) | (P::Update, A::Remove) | (P::Delete, A::Remove) => {
            Transition::Tag(P::Delete)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ItemAction as A;
    use PendingOperation as P;

    #[test]
    fn transition_table_matches_item_lifecycle() {
        let cases = [
            (P::Unchanged, A::Update, Transition::Tag(P::Update)),
            (P::Unchanged, A::Reorder { moved: true }, Transition::Tag(P::Update)),
            (P::Unchanged, A::Reorder { moved: false }, Transition::Tag(P::Unchanged)),
            (P::Unchanged, A::Remove, Transition::Tag(P::Delete)),
            (P::Update, A::Remove, Transition::Tag(P::Delete)),
            (P::Update, A::Update, Transition::Tag(P::Update)),
            (P::Update, A::Reorder { moved: false }, Transition::Tag(P::Update)),
            (P::Delete, A::Update, Transition::Tag(P::Update)),
            (P::Delete, A::Remove, Transition::Tag(P::Delete)),
            (P::Delete, A::Reorder { moved: true }, Transition::Tag(P::Delete)),
            (P::Create, A::Update, Transition::Tag(P::Create)),
            (P::Create, A::Remove, Transition::Purge),
            (P::Create, A::Reorder { moved: true }, Transition::Tag(P::Create)),
        ];

        for (current, action, expected) in cases {
            assert_eq!(
                next_operation(current, action),
                expected,
                "{:?} --{:?}-->",
                current,
                action
            );
        }
    }

    #[test]
    fn no_action_leads_back_to_create() {
        let actions = [
            A::Update,
            A::Remove,
            A::Reorder { moved: true },
            A::Reorder { moved: false },
        ];
        for current in [P::Unchanged, P::Update, P::Delete] {
            for action in actions {
                assert_ne!(next_operation(current, action), Transition::Tag(P::Create));
            }
        }
    }

    #[test]
    fn operation_names_follow_wire_format() {
        assert_eq!(serde_json::to_string(&P::Unchanged).unwrap(), "\"none\"");
        assert_eq!(serde_json::to_string(&P::Delete).unwrap(), "\"delete\"");
        assert_eq!(P::Create.as_str(), "create");
    }
}
