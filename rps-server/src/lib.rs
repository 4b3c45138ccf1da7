//! 石头剪刀布对战服务端
//!
//! 包含:
//! - 连接处理与命令分发
//! - 匹配队列与对局回合状态机
//! - 排行榜
//! - 管理员控制台与广播关闭

pub mod admin;
pub mod handler;
pub mod player;
pub mod ranking;
pub mod server;
pub mod session;
pub mod state;

pub use player::PlayerHandle;
pub use ranking::Ranking;
pub use server::{serve, ServerConfig};
pub use session::{MatchConfig, MatchSession, Matchmaker};
pub use state::SharedState;
