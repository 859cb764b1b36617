//! 错误类型定义

use thiserror::Error;

/// 走法拒绝原因
///
/// Display 字符串即下发给请求方的文案；任何拒绝都不改变共享状态。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// 对局已结束
    #[error("Game over")]
    GameOver,

    /// 起点或终点不存在
    #[error("Invalid cells")]
    InvalidCells,

    /// 起点不归走子方所有
    #[error("Not your piece")]
    NotYourPiece,

    /// 终点已被占用
    #[error("Destination occupied")]
    DestinationOccupied,

    /// 距离不是 1 或 2
    #[error("Move distance must be 1 or 2")]
    BadDistance,
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 协议版本不匹配
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
