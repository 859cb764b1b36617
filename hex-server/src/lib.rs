//! 六角同化棋服务端
//!
//! 包含:
//! - 会话注册表
//! - 大厅
//! - 对局编排
//! - 事件调度与连接管理

pub mod arena;
pub mod lobby;
pub mod server;
pub mod session;

pub use arena::{Match, MatchArena, MatchId};
pub use lobby::Lobby;
pub use server::{run, EventHandler, ServerState};
pub use session::{Session, SessionRegistry};
