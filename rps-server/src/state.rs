//! 共享状态
//!
//! 等待队列、连接注册表、排行榜由同一把互斥锁保护，只通过本模块的
//! 方法读写；锁绝不跨越 await 点或套接字 IO。不变式：任一时刻一名
//! 玩家至多出现在等待队列与活动对局之一中。

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use protocol::{ConnId, RankingEntry, ServerMessage};

use crate::player::PlayerHandle;
use crate::ranking::Ranking;

#[derive(Default)]
struct StateInner {
    /// 等待匹配的玩家，按到达顺序排列（FIFO）
    waiting: VecDeque<PlayerHandle>,
    /// 所有存活连接，仅用于广播与关闭，与匹配状态无关
    connections: HashMap<ConnId, UnboundedSender<ServerMessage>>,
    /// 排行榜
    ranking: Ranking,
}

/// 共享状态对象
#[derive(Default)]
pub struct SharedState {
    inner: Mutex<StateInner>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StateInner> {
        self.inner.lock().expect("共享状态锁中毒")
    }

    // === 连接注册表 ===

    /// 注册新连接
    pub fn register(&self, conn_id: ConnId, tx: UnboundedSender<ServerMessage>) {
        let mut inner = self.lock();
        inner.connections.insert(conn_id, tx);
        debug!(conn_id, online = inner.connections.len(), "连接注册");
    }

    /// 注销连接
    pub fn unregister(&self, conn_id: ConnId) {
        let mut inner = self.lock();
        inner.connections.remove(&conn_id);
        debug!(conn_id, online = inner.connections.len(), "连接注销");
    }

    /// 当前在线连接数
    pub fn online_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// 向所有注册连接广播同一条消息，返回通知到的连接数
    pub fn broadcast(&self, msg: ServerMessage) -> usize {
        // 锁内只复制发送端，发送在锁外进行
        let targets: Vec<UnboundedSender<ServerMessage>> =
            self.lock().connections.values().cloned().collect();

        let count = targets.len();
        for tx in targets {
            let _ = tx.send(msg.clone());
        }
        count
    }

    // === 等待队列 ===

    /// 玩家入队等待匹配
    pub fn enqueue(&self, player: PlayerHandle) {
        self.lock().waiting.push_back(player);
    }

    /// 原子取出最早入队的两名玩家
    pub fn pop_pair(&self) -> Option<(PlayerHandle, PlayerHandle)> {
        let mut inner = self.lock();
        if inner.waiting.len() < 2 {
            return None;
        }
        let first = inner.waiting.pop_front()?;
        let second = inner.waiting.pop_front()?;
        Some((first, second))
    }

    /// 将指定连接的玩家移出等待队列（断线清理），返回是否有移除
    pub fn remove_waiting(&self, conn_id: ConnId) -> bool {
        let mut inner = self.lock();
        let before = inner.waiting.len();
        inner.waiting.retain(|p| p.conn_id != conn_id);
        inner.waiting.len() != before
    }

    /// 指定连接的玩家是否仍在等待队列
    pub fn is_waiting(&self, conn_id: ConnId) -> bool {
        self.lock().waiting.iter().any(|p| p.conn_id == conn_id)
    }

    // === 排行榜 ===

    /// 确保排行榜条目存在，不重置已有计数
    pub fn ensure_ranked(&self, name: &str) {
        self.lock().ranking.ensure(name);
    }

    /// 记录一次回合胜利
    pub fn record_round_win(&self, name: &str) {
        self.lock().ranking.increment(name);
    }

    /// 某玩家当前胜场
    pub fn round_wins(&self, name: &str) -> u32 {
        self.lock().ranking.get(name)
    }

    /// 排行榜时点快照
    pub fn ranking_snapshot(&self) -> Vec<RankingEntry> {
        self.lock().ranking.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn player(conn_id: ConnId, name: &str) -> (PlayerHandle, UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PlayerHandle::new(conn_id, name.to_string(), tx), rx)
    }

    #[test]
    fn test_fifo_pairing() {
        let state = SharedState::new();
        for (id, name) in [(1, "Ana"), (2, "Bia"), (3, "Caio"), (4, "Dio")] {
            state.enqueue(player(id, name).0);
        }

        let (p1, p2) = state.pop_pair().unwrap();
        assert_eq!((p1.conn_id, p2.conn_id), (1, 2));

        let (p3, p4) = state.pop_pair().unwrap();
        assert_eq!((p3.conn_id, p4.conn_id), (3, 4));

        assert!(state.pop_pair().is_none());
    }

    #[test]
    fn test_single_player_is_not_paired() {
        let state = SharedState::new();
        state.enqueue(player(1, "Ana").0);

        assert!(state.pop_pair().is_none());
        assert!(state.is_waiting(1));
    }

    #[test]
    fn test_pop_pair_removes_queue_membership() {
        let state = SharedState::new();
        state.enqueue(player(1, "Ana").0);
        state.enqueue(player(2, "Bia").0);

        state.pop_pair().unwrap();

        // 配对后玩家不再属于等待队列
        assert!(!state.is_waiting(1));
        assert!(!state.is_waiting(2));
    }

    #[test]
    fn test_remove_waiting_on_disconnect() {
        let state = SharedState::new();
        state.enqueue(player(1, "Ana").0);
        state.enqueue(player(2, "Bia").0);
        state.enqueue(player(3, "Caio").0);

        assert!(state.remove_waiting(2));
        assert!(!state.remove_waiting(2));

        // 剩余玩家仍按原顺序配对
        let (p1, p2) = state.pop_pair().unwrap();
        assert_eq!((p1.conn_id, p2.conn_id), (1, 3));
    }

    #[test]
    fn test_fifo_under_concurrent_insertion() {
        let state = Arc::new(SharedState::new());
        let threads = 4;
        let per_thread = 50u64;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        let conn_id = t * 1000 + i;
                        state.enqueue(player(conn_id, "jogador").0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut popped = Vec::new();
        while let Some((a, b)) = state.pop_pair() {
            popped.push(a.conn_id);
            popped.push(b.conn_id);
        }

        // 每名玩家恰好被取出一次
        assert_eq!(popped.len() as u64, threads * per_thread);
        let mut unique = popped.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), popped.len());

        // 同一线程内的入队顺序在出队序列中保持不变
        for t in 0..threads {
            let sequence: Vec<u64> = popped
                .iter()
                .copied()
                .filter(|id| id / 1000 == t)
                .collect();
            assert!(sequence.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_ranking_through_state() {
        let state = SharedState::new();

        state.ensure_ranked("Ana");
        state.record_round_win("Ana");
        state.ensure_ranked("Ana");
        assert_eq!(state.round_wins("Ana"), 1);

        let snapshot = state.ranking_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].vitorias, 1);
    }

    #[test]
    fn test_broadcast_reaches_registered_connections() {
        let state = SharedState::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        state.register(1, tx1);
        state.register(2, tx2);
        state.register(3, tx3);
        state.unregister(3);

        let msg = ServerMessage::End {
            mensagem: "servidor encerrado".to_string(),
        };
        assert_eq!(state.broadcast(msg.clone()), 2);

        assert_eq!(rx1.try_recv().unwrap(), msg);
        assert_eq!(rx2.try_recv().unwrap(), msg);
        assert!(rx3.try_recv().is_err());
    }
}
