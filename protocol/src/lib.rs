//! 六角同化棋共享协议库
//!
//! 包含:
//! - 格子、棋盘、六角距离等核心数据结构
//! - 走法验证与吃子引擎
//! - 对局状态机 (Game)
//! - 事件类型定义 (ClientEvent, ServerEvent)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 帧编解码

mod board;
mod cell;
mod constants;
mod error;
mod game;
mod message;
mod moves;
mod transport;

pub use board::{Board, PLAYER1_START, PLAYER2_START};
pub use cell::{hex_distance, Cell, CellId, Role};
pub use constants::*;
pub use error::{MoveError, ProtocolError, Result};
pub use game::{Game, Winner};
pub use message::{ClientEvent, LobbyEntry, MatchStart, PlayerId, RoleNames, ServerEvent};
pub use moves::{CaptureEngine, MoveKind, MoveValidator};
pub use transport::{
    Connection, Connector, FrameReader, FrameWriter, Listener, NetworkConfig, TcpConnection,
    TcpConnector, TcpListener,
};
