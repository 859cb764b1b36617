//! 格子与角色定义

use serde::{Deserialize, Serialize};

/// 格子 ID（棋盘生命周期内稳定，按生成顺序升序分配）
pub type CellId = u32;

/// 对局角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 先手（挑战发起方）
    #[serde(rename = "player1")]
    Player1,
    /// 后手（挑战接受方）
    #[serde(rename = "player2")]
    Player2,
}

impl Role {
    /// 获取对方角色
    pub fn opponent(&self) -> Role {
        match self {
            Role::Player1 => Role::Player2,
            Role::Player2 => Role::Player1,
        }
    }

    /// 协议字面量
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player1 => "player1",
            Role::Player2 => "player2",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 六角格子，轴向坐标 (q, r)，隐含第三坐标 s = -q - r
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub q: i32,
    pub r: i32,
    /// 归属方（None 表示空格）
    pub player: Option<Role>,
}

impl Cell {
    /// 创建空格子
    pub fn new(id: CellId, q: i32, r: i32) -> Self {
        Self {
            id,
            q,
            r,
            player: None,
        }
    }
}

/// 六角距离：(|Δq| + |Δr| + |Δq+Δr|) / 2
pub fn hex_distance(a: &Cell, b: &Cell) -> i32 {
    let dq = a.q - b.q;
    let dr = a.r - b.r;
    (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
}
