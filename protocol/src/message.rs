//! 事件类型定义
//!
//! 事件在线路上的形态为 {"event": 名称, "data": 载荷}，
//! 名称与载荷字段均为 camelCase 字面量。

use serde::{Deserialize, Serialize};

use crate::cell::{CellId, Role};
use crate::game::Game;

/// 参与者 ID（由传输层在连接建立时分配）
pub type PlayerId = u64;

/// 大厅条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyEntry {
    pub id: PlayerId,
    pub username: String,
}

/// 角色 -> 展示名映射（随 matchStarted 下发）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleNames {
    pub player1: String,
    pub player2: String,
}

/// matchStarted 载荷：对局快照 + 双方展示名 + 接收方自己的角色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStart {
    #[serde(flatten)]
    pub state: Game,
    pub players: RoleNames,
    pub your_role: Role,
}

/// 客户端发送给服务端的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    // === 大厅 ===
    /// 加入大厅（设置展示名；重复加入原位更新）
    JoinLobby { username: String },
    /// 向目标参与者发起挑战
    #[serde(rename_all = "camelCase")]
    ChallengePlayer { target_id: PlayerId },
    /// 接受挑战
    #[serde(rename_all = "camelCase")]
    AcceptChallenge { challenger_id: PlayerId },
    /// 拒绝挑战
    #[serde(rename_all = "camelCase")]
    DeclineChallenge { challenger_id: PlayerId },

    // === 对局 ===
    /// 走子（player 为走子方声称的角色）
    #[serde(rename_all = "camelCase")]
    MakeMove {
        from_cell_id: CellId,
        target_cell_id: CellId,
        player: Role,
    },
    /// 投降
    Surrender,
    /// 离开对局（回到大厅）
    LeaveGame,
    /// 重置对局
    ResetGame,
}

/// 服务端发送给客户端的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    // === 大厅 ===
    /// 大厅全量名单（插入序）
    LobbyUpdate(Vec<LobbyEntry>),
    /// 收到挑战
    #[serde(rename_all = "camelCase")]
    ChallengeReceived {
        challenger_id: PlayerId,
        challenger_name: String,
    },
    /// 挑战被拒绝
    ChallengeDeclined { from: PlayerId },

    // === 对局 ===
    /// 对局开始（含角色分配，两名参与者各收到一份）
    MatchStarted(MatchStart),
    /// 对局状态快照
    GameState(Game),
    /// 走法被拒绝（原因文案）
    InvalidMove(String),
}
