//! 走法验证与吃子引擎

use crate::board::Board;
use crate::cell::{hex_distance, CellId, Role};
use crate::error::MoveError;

/// 走法种类（由距离决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// 距离 1：复制，原格保留归属
    Clone,
    /// 距离 2：跳跃，原格清空
    Jump,
}

/// 走法验证器（只读，不修改棋盘）
pub struct MoveValidator;

impl MoveValidator {
    /// 验证走法合法性
    ///
    /// 合法条件：对局未结束、两格均存在、起点归 `as_role` 所有、
    /// 终点为空、距离为 1 或 2。不校验走子顺序。
    pub fn validate(
        board: &Board,
        from: CellId,
        to: CellId,
        as_role: Role,
        game_over: bool,
    ) -> Result<MoveKind, MoveError> {
        if game_over {
            return Err(MoveError::GameOver);
        }

        let (from_cell, to_cell) = match (board.cell(from), board.cell(to)) {
            (Some(f), Some(t)) => (f, t),
            _ => return Err(MoveError::InvalidCells),
        };

        if from_cell.player != Some(as_role) {
            return Err(MoveError::NotYourPiece);
        }
        if to_cell.player.is_some() {
            return Err(MoveError::DestinationOccupied);
        }

        match hex_distance(from_cell, to_cell) {
            1 => Ok(MoveKind::Clone),
            2 => Ok(MoveKind::Jump),
            _ => Err(MoveError::BadDistance),
        }
    }

    /// 指定格子是否存在至少一个合法目标（空格且距离为 1 或 2）
    pub fn has_destination(board: &Board, from: CellId) -> bool {
        let from_cell = match board.cell(from) {
            Some(c) => c,
            None => return false,
        };
        board
            .cells()
            .iter()
            .any(|c| c.player.is_none() && matches!(hex_distance(from_cell, c), 1 | 2))
    }

    /// 指定角色是否还有可走的棋
    pub fn side_has_moves(board: &Board, role: Role) -> bool {
        board
            .cells_of(role)
            .iter()
            .any(|&id| Self::has_destination(board, id))
    }
}

/// 吃子引擎
pub struct CaptureEngine;

impl CaptureEngine {
    /// 落子后的单次翻转：目标格距离恰为 1 的所有对方格子翻转给走子方。
    /// 单趟扫描，不级联。
    pub fn apply(board: &mut Board, target: CellId, mover: Role) {
        let target_cell = match board.cell(target) {
            Some(c) => *c,
            None => return,
        };
        let opponent = mover.opponent();
        for cell in board.cells_mut() {
            if cell.player == Some(opponent) && hex_distance(&target_cell, cell) == 1 {
                cell.player = Some(mover);
            }
        }
    }
}
