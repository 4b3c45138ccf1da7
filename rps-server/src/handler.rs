//! 连接处理
//!
//! 每条连接一个读循环：解码帧、按类型码分发、更新共享状态。
//! 单帧解码失败只丢弃该帧（协议可自行重新同步），连接级错误才退出循环。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use protocol::{
    ClientMessage, ConnId, Connection as _, Move, ProtocolError, ServerMessage, TcpConnection,
};

use crate::player::PlayerHandle;
use crate::state::SharedState;

/// 读循环退出后等待写端任务排空队列的时限
const WRITER_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// 处理一条已接受的连接
///
/// 返回时连接已注销并移出等待队列；正处于对局中的玩家不会被强行
/// 移出对局，由回合超时机制发现其消失。
pub async fn handle_connection(state: Arc<SharedState>, conn: TcpConnection, conn_id: ConnId) {
    let peer = conn.peer_addr().unwrap_or_else(|| "desconhecido".to_string());
    info!(conn_id, %peer, "新连接");

    let (mut reader, mut writer) = conn.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.register(conn_id, tx.clone());

    // 写端任务：把发往该玩家的消息逐帧串行写入套接字
    let mut writer_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = writer.write_frame(&msg).await {
                warn!("写入失败: {e}");
                break;
            }
        }
    });

    let mut player: Option<PlayerHandle> = None;

    loop {
        match reader.read_frame::<ClientMessage>().await {
            Ok(msg) => {
                if !dispatch(&state, conn_id, &tx, &mut player, msg) {
                    break;
                }
            }
            // 解码失败只丢弃出错的帧，继续读后续帧
            Err(e) if e.is_decode_error() => {
                warn!(conn_id, "忽略无法解码的帧: {e}");
            }
            Err(ProtocolError::ConnectionClosed) => {
                debug!(conn_id, "对端关闭连接");
                break;
            }
            Err(e) => {
                warn!(conn_id, "读取失败: {e}");
                break;
            }
        }
    }

    // 清理仅涉及注册表与等待队列；之后冲刷写端并关闭套接字
    state.unregister(conn_id);
    if state.remove_waiting(conn_id) {
        debug!(conn_id, "已移出等待队列");
    }

    // 丢弃本地发送端后，写端任务会在排空已入队的回复时自行结束；
    // 对局任务可能仍持有发送端的克隆，等待以短时限为界
    drop(player);
    drop(tx);
    if timeout(WRITER_FLUSH_TIMEOUT, &mut writer_task).await.is_err() {
        writer_task.abort();
    }
    info!(conn_id, %peer, online = state.online_count(), "连接关闭");
}

/// 分发一条客户端命令，返回 false 表示应结束读循环
fn dispatch(
    state: &SharedState,
    conn_id: ConnId,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    player: &mut Option<PlayerHandle>,
    msg: ClientMessage,
) -> bool {
    match msg {
        ClientMessage::Connect { name } => {
            // 每条连接只接受一次 CON，重复的静默忽略
            if player.is_some() {
                debug!(conn_id, "重复的 CON，忽略");
                return true;
            }
            let handle = PlayerHandle::new(conn_id, name, tx.clone());
            state.ensure_ranked(&handle.name);
            state.enqueue(handle.clone());
            info!(conn_id, player = %handle.name, "玩家加入等待队列");
            *player = Some(handle);
        }
        ClientMessage::Rock {} => submit_move(player, Move::Rock, conn_id),
        ClientMessage::Paper {} => submit_move(player, Move::Paper, conn_id),
        ClientMessage::Scissors {} => submit_move(player, Move::Scissors, conn_id),
        ClientMessage::Ranking {} => {
            // 随时可查，只回复请求方，绝不广播
            let snapshot = state.ranking_snapshot();
            let _ = tx.send(ServerMessage::Ranking { ranking: snapshot });
        }
        ClientMessage::Quit {} => {
            debug!(conn_id, "收到 QUI");
            return false;
        }
    }
    true
}

/// 记录出拳；尚未报告身份的连接发来的出拳按协议静默忽略
fn submit_move(player: &Option<PlayerHandle>, mv: Move, conn_id: ConnId) {
    match player {
        Some(p) => {
            debug!(player = %p.name, ?mv, "收到出拳");
            p.submit_move(mv);
        }
        None => debug!(conn_id, ?mv, "未注册连接的出拳，忽略"),
    }
}
