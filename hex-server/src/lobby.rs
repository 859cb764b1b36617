//! 大厅

use protocol::{LobbyEntry, PlayerId};

/// 大厅：未入局会话的有序名单。
///
/// 顺序为插入序；同一身份重复加入时原位更新展示名而不重复入列。
#[derive(Debug, Default)]
pub struct Lobby {
    entries: Vec<LobbyEntry>,
}

impl Lobby {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 插入或原位更新
    pub fn upsert(&mut self, id: PlayerId, username: String) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.username = username;
        } else {
            self.entries.push(LobbyEntry { id, username });
        }
    }

    /// 移除指定身份（不在大厅时为空操作）
    pub fn remove(&mut self, id: PlayerId) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// 全量快照（lobbyUpdate 广播的载荷）
    pub fn snapshot(&self) -> Vec<LobbyEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
