//! 玩家句柄

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use protocol::{ConnId, Move, ServerMessage};

/// 玩家句柄
///
/// 名字允许重复，身份以连接 ID 区分。出拳槽位由持有连接的处理器写入、
/// 由对局任务读取并清空，两端共享同一把锁。句柄可廉价克隆，克隆体
/// 指向同一个槽位和发送通道。
#[derive(Clone)]
pub struct PlayerHandle {
    /// 所属连接 ID
    pub conn_id: ConnId,
    /// 玩家报告的名字
    pub name: String,
    /// 发往该玩家的消息通道
    tx: UnboundedSender<ServerMessage>,
    /// 当前回合出拳槽位（None = 尚未出拳）
    current_move: Arc<Mutex<Option<Move>>>,
}

impl PlayerHandle {
    pub fn new(conn_id: ConnId, name: String, tx: UnboundedSender<ServerMessage>) -> Self {
        Self {
            conn_id,
            name,
            tx,
            current_move: Arc::new(Mutex::new(None)),
        }
    }

    /// 发送消息；连接已消失时仅记录警告，不影响对局推进
    pub fn send(&self, msg: ServerMessage) {
        if self.tx.send(msg).is_err() {
            warn!(player = %self.name, "发送消息时连接已断开");
        }
    }

    /// 写入本回合出拳（回合判定前重复提交，后写覆盖先写）
    pub fn submit_move(&self, mv: Move) {
        *self.current_move.lock().expect("出拳槽位锁中毒") = Some(mv);
    }

    /// 槽位是否已有出拳
    pub fn has_move(&self) -> bool {
        self.current_move.lock().expect("出拳槽位锁中毒").is_some()
    }

    /// 取出并清空槽位
    pub fn take_move(&self) -> Option<Move> {
        self.current_move.lock().expect("出拳槽位锁中毒").take()
    }
}
