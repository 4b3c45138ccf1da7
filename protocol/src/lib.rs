//! 石头剪刀布对战服务共享协议库
//!
//! 包含:
//! - 消息类型定义 (ClientMessage, ServerMessage)
//! - 出拳与回合判定规则
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 行分隔 JSON 帧编解码 (FrameReader, FrameWriter)

mod constants;
mod error;
mod message;
mod rules;
mod transport;

pub use constants::*;
pub use error::{ProtocolError, Result};
pub use message::{ClientMessage, ConnId, RankingEntry, ServerMessage};
pub use rules::{resolve, Move, RoundOutcome};
pub use transport::{
    Connection, Connector, FrameReader, FrameWriter, Listener,
    TcpConnection, TcpConnector, TcpListener,
};
