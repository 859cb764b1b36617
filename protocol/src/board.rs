//! 棋盘模型

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellId, Role};
use crate::constants::{cell_count, BOARD_RADIUS};

/// 双方初始占位：各占三个交错的角位。
/// 该坐标集是协议契约的一部分，改动即改变棋力平衡。
pub const PLAYER1_START: [(i32, i32); 3] = [(-4, 0), (4, -4), (0, 4)];
pub const PLAYER2_START: [(i32, i32); 3] = [(4, 0), (-4, 4), (0, -4)];

/// 棋盘：半径 N 的六角网格，构建后格子数固定不变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    /// 创建初始棋盘（含双方起始占位）
    pub fn new() -> Self {
        let mut board = Self::build(BOARD_RADIUS);
        for &(q, r) in &PLAYER1_START {
            if let Some(cell) = board.cell_at_mut(q, r) {
                cell.player = Some(Role::Player1);
            }
        }
        for &(q, r) in &PLAYER2_START {
            if let Some(cell) = board.cell_at_mut(q, r) {
                cell.player = Some(Role::Player2);
            }
        }
        board
    }

    /// 枚举半径 N 内的所有格子：q ∈ [-N, N]，r ∈ [max(-N, -q-N), min(N, -q+N)]，
    /// ID 按生成顺序升序分配
    fn build(radius: i32) -> Self {
        let mut cells = Vec::with_capacity(cell_count(radius));
        let mut id: CellId = 0;
        for q in -radius..=radius {
            let r_min = (-radius).max(-q - radius);
            let r_max = radius.min(-q + radius);
            for r in r_min..=r_max {
                cells.push(Cell::new(id, q, r));
                id += 1;
            }
        }
        Self { cells }
    }

    /// 格子总数
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 按 ID 获取格子（ID 即生成序号）
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id as usize)
    }

    /// 按 ID 获取格子（可变）
    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id as usize)
    }

    /// 按轴向坐标获取格子
    pub fn cell_at(&self, q: i32, r: i32) -> Option<&Cell> {
        self.cells.iter().find(|c| c.q == q && c.r == r)
    }

    fn cell_at_mut(&mut self, q: i32, r: i32) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.q == q && c.r == r)
    }

    /// 所有格子（ID 升序）
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// 指定角色占有的格子数
    pub fn count(&self, role: Role) -> usize {
        self.cells
            .iter()
            .filter(|c| c.player == Some(role))
            .count()
    }

    /// 指定角色占有的所有格子 ID
    pub fn cells_of(&self, role: Role) -> Vec<CellId> {
        self.cells
            .iter()
            .filter(|c| c.player == Some(role))
            .map(|c| c.id)
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
