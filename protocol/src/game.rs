//! 对局状态机

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cell::{CellId, Role};
use crate::error::MoveError;
use crate::moves::{CaptureEngine, MoveKind, MoveValidator};

/// 胜者：角色、平局或展示名（投降/离开时由会话注册表解析出展示名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Winner {
    Role(Role),
    Draw,
    Name(String),
}

impl Winner {
    /// 协议字面量："player1" / "player2" / "draw" / 展示名
    pub fn as_str(&self) -> &str {
        match self {
            Winner::Role(role) => role.as_str(),
            Winner::Draw => "draw",
            Winner::Name(name) => name,
        }
    }
}

impl Serialize for Winner {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Winner {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "player1" => Winner::Role(Role::Player1),
            "player2" => Winner::Role(Role::Player2),
            "draw" => Winner::Draw,
            _ => Winner::Name(s),
        })
    }
}

/// 对局：棋盘 + 回合指针 + 终局状态
///
/// 两名参与者共享同一个实例；序列化形态即对外快照
/// (board / currentPlayer / gameOver / winner / opponentLeft)。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub board: Board,
    pub current_player: Role,
    pub game_over: bool,
    pub winner: Option<Winner>,
    pub opponent_left: bool,
}

impl Game {
    /// 创建初始对局（player1 先手）
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Role::Player1,
            game_over: false,
            winner: None,
            opponent_left: false,
        }
    }

    /// 重置为初始配置；任意状态下可用，终局标记与胜者一并清除
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 执行走法
    ///
    /// 成功：跳跃清空原格，落子，单次翻转，换边，终局判定。
    /// 失败：状态不变，返回原因。
    pub fn make_move(&mut self, from: CellId, to: CellId, as_role: Role) -> Result<(), MoveError> {
        let kind = MoveValidator::validate(&self.board, from, to, as_role, self.game_over)?;

        if kind == MoveKind::Jump {
            if let Some(cell) = self.board.cell_mut(from) {
                cell.player = None;
            }
        }
        if let Some(cell) = self.board.cell_mut(to) {
            cell.player = Some(as_role);
        }
        CaptureEngine::apply(&mut self.board, to, as_role);

        self.current_player = as_role.opponent();
        self.check_game_over();
        Ok(())
    }

    /// 终局判定：新走子方无任何合法走法则结束，按占格数严格多数定胜负，相等为平局
    fn check_game_over(&mut self) {
        if MoveValidator::side_has_moves(&self.board, self.current_player) {
            return;
        }
        self.game_over = true;

        let p1 = self.board.count(Role::Player1);
        let p2 = self.board.count(Role::Player2);
        self.winner = Some(if p1 > p2 {
            Winner::Role(Role::Player1)
        } else if p2 > p1 {
            Winner::Role(Role::Player2)
        } else {
            Winner::Draw
        });
    }

    /// 投降：立即结束，不动棋盘。已结束的对局不受影响（返回 false）。
    pub fn surrender(&mut self, winner: Winner) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        self.winner = Some(winner);
        true
    }

    /// 对方离开：立即结束并标记 opponentLeft。已结束的对局不受影响（返回 false）。
    pub fn mark_opponent_left(&mut self, winner: Winner) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        self.opponent_left = true;
        self.winner = Some(winner);
        true
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
