//! クライアント専用ID（localId）の採番

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::item::RemoteId;

/// クライアント専用の項目ID。サーバーには送られない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(String);

impl LocalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// localId 採番器
///
/// * 既存項目: `remote:<id>`、IDが無ければ `position:<index>`
/// * 新規項目: `new:<counter>`（カウンタはストアの生存期間中単調増加）
///
/// 払い出し済みIDはセッション中保持し、削除済み項目のIDも再利用しない。
#[derive(Debug, Clone, Default)]
pub struct LocalIdAllocator {
    next_counter: u64,
    issued: HashSet<LocalId>,
}

impl LocalIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// セッション開始時に払い出し済み集合を破棄する（カウンタは維持）
    pub fn begin_session(&mut self) {
        self.issued.clear();
    }

    /// リモート項目用のIDを採番
    pub fn for_remote(&mut self, id: Option<&RemoteId>, position: usize) -> LocalId {
        let candidate = match id {
            Some(id) => format!("remote:{}", id),
            None => format!("position:{}", position),
        };
        self.claim(candidate)
    }

    /// 新規項目用のIDを採番
    pub fn for_new(&mut self) -> LocalId {
        let candidate = format!("new:{}", self.bump());
        self.claim(candidate)
    }

    pub fn is_issued(&self, id: &LocalId) -> bool {
        self.issued.contains(id)
    }

    fn bump(&mut self) -> u64 {
        self.next_counter += 1;
        self.next_counter
    }

    fn claim(&mut self, candidate: String) -> LocalId {
        let mut id = LocalId(candidate.clone());
        // リモートIDの重複などで衝突した場合は接尾辞で区別する
        while self.issued.contains(&id) {
            id = LocalId(format!("{}#{}", candidate, self.bump()));
        }
        self.issued.insert(id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_ids_derive_from_remote_identity() {
        let mut allocator = LocalIdAllocator::new();
        let a = allocator.for_remote(Some(&RemoteId::from("a")), 0);
        let fallback = allocator.for_remote(None, 1);

        assert_eq!(a.as_str(), "remote:a");
        assert_eq!(fallback.as_str(), "position:1");
    }

    #[test]
    fn duplicated_remote_ids_are_disambiguated() {
        let mut allocator = LocalIdAllocator::new();
        let first = allocator.for_remote(Some(&RemoteId::from("a")), 0);
        let second = allocator.for_remote(Some(&RemoteId::from("a")), 1);

        assert_ne!(first, second);
        assert!(second.as_str().starts_with("remote:a#"));
    }

    #[test]
    fn new_ids_are_never_reused() {
        let mut allocator = LocalIdAllocator::new();
        let first = allocator.for_new();
        allocator.begin_session();
        let second = allocator.for_new();

        assert_ne!(first, second);
        assert!(allocator.is_issued(&second));
        assert!(!allocator.is_issued(&first));
    }

    #[test]
    fn new_id_does_not_collide_with_seeded_fallback() {
        let mut allocator = LocalIdAllocator::new();
        let seeded = allocator.for_remote(Some(&RemoteId::from("new:1")), 0);
        let fresh = allocator.for_new();
        assert_ne!(seeded.as_str(), fresh.as_str());
    }
}
