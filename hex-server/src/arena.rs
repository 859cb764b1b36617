//! 对局编排

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use protocol::{Game, PlayerId, Role};

/// 对局 ID
pub type MatchId = u64;

/// 对局：一个 Game 实例与绑定的两名参与者。
///
/// 双方会话只持有 MatchId，所有变更经由竞技场的唯一访问器执行，
/// 任一方的改动对双方立即可见。
pub struct Match {
    pub id: MatchId,
    /// 挑战发起方（player1）
    pub player1: PlayerId,
    /// 挑战接受方（player2）
    pub player2: PlayerId,
    pub game: Game,
}

impl Match {
    /// 创建新对局：发起方固定为 player1，接受方为 player2
    pub fn new(id: MatchId, challenger: PlayerId, accepter: PlayerId) -> Self {
        Self {
            id,
            player1: challenger,
            player2: accepter,
            game: Game::new(),
        }
    }

    /// 两名成员（用于 O(成员数) 广播）
    pub fn members(&self) -> [PlayerId; 2] {
        [self.player1, self.player2]
    }

    /// 检查参与者是否为成员
    pub fn has_member(&self, id: PlayerId) -> bool {
        self.player1 == id || self.player2 == id
    }

    /// 成员的角色
    pub fn role_of(&self, id: PlayerId) -> Option<Role> {
        if self.player1 == id {
            Some(Role::Player1)
        } else if self.player2 == id {
            Some(Role::Player2)
        } else {
            None
        }
    }

    /// 对方成员
    pub fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        if self.player1 == id {
            Some(self.player2)
        } else if self.player2 == id {
            Some(self.player1)
        } else {
            None
        }
    }
}

/// 竞技场：MatchId -> Match 的唯一属主
pub struct MatchArena {
    matches: HashMap<MatchId, Match>,
    next_id: AtomicU64,
}

impl MatchArena {
    pub fn new() -> Self {
        Self {
            matches: HashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn generate_id(&self) -> MatchId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// 创建对局
    pub fn create(&mut self, challenger: PlayerId, accepter: PlayerId) -> MatchId {
        let id = self.generate_id();
        self.matches.insert(id, Match::new(id, challenger, accepter));
        id
    }

    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    pub fn get_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.get_mut(&id)
    }

    /// 移除对局
    pub fn remove(&mut self, id: MatchId) -> Option<Match> {
        self.matches.remove(&id)
    }

    /// 活跃对局数
    pub fn count(&self) -> usize {
        self.matches.len()
    }
}

impl Default for MatchArena {
    fn default() -> Self {
        Self::new()
    }
}
