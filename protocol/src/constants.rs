//! 协议常量定义

use std::time::Duration;

/// 协议版本号
pub const PROTOCOL_VERSION: u8 = 1;

/// 棋盘半径（固定配置；格子存在当且仅当 max(|q|,|r|,|s|) <= N）
pub const BOARD_RADIUS: i32 = 4;

/// 半径 N 的棋盘格子总数：3N² + 3N + 1
pub const fn cell_count(radius: i32) -> usize {
    (3 * radius * radius + 3 * radius + 1) as usize
}

/// 消息帧最大大小
pub const MAX_FRAME_SIZE: usize = 65536;

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 3000;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);
