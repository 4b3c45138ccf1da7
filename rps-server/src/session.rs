//! 匹配与对局回合状态机
//!
//! 匹配循环轮询等待队列，凑齐两人即按 FIFO 取出并开启一局；每局作为
//! 独立任务运行三个回合。出拳等待采用固定间隔轮询加回合截止时间：
//! 检测延迟有界（几十毫秒量级），回合一旦开始不会被取消，对手断线
//! 也只能等到双方出拳齐备或截止时间到。

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use protocol::{resolve, Move, RoundOutcome, ServerMessage, ROUNDS_PER_MATCH, ROUND_TIMEOUT};

use crate::player::PlayerHandle;
use crate::state::SharedState;

/// 对局节奏参数
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// 匹配循环轮询间隔
    pub pairing_interval: Duration,
    /// 匹配通知到第一回合开始的等待（给客户端切换界面的时间）
    pub start_delay: Duration,
    /// 出拳槽位轮询间隔
    pub poll_interval: Duration,
    /// 回合截止时间
    pub round_timeout: Duration,
    /// 回合之间的间歇
    pub round_gap: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            pairing_interval: Duration::from_millis(500),
            start_delay: Duration::from_millis(500),
            poll_interval: Duration::from_millis(100),
            round_timeout: ROUND_TIMEOUT,
            round_gap: Duration::from_secs(2),
        }
    }
}

/// 匹配器
///
/// 后台循环，从等待队列成对取出最早到达的玩家并为每对开启一个
/// 对局任务；多局可并发推进，队列与排行榜的锁纪律不受影响。
pub struct Matchmaker {
    state: Arc<SharedState>,
    config: MatchConfig,
}

impl Matchmaker {
    pub fn new(state: Arc<SharedState>, config: MatchConfig) -> Self {
        Self { state, config }
    }

    /// 匹配循环，随进程存活
    pub async fn run(self) {
        loop {
            while let Some((first, second)) = self.state.pop_pair() {
                info!(first = %first.name, second = %second.name, "开启对局");
                let session = MatchSession::new(
                    first,
                    second,
                    Arc::clone(&self.state),
                    self.config.clone(),
                );
                tokio::spawn(session.run());
            }
            sleep(self.config.pairing_interval).await;
        }
    }
}

/// 一局三回合的对局
pub struct MatchSession {
    players: [PlayerHandle; 2],
    scores: [u32; 2],
    state: Arc<SharedState>,
    config: MatchConfig,
}

impl MatchSession {
    pub fn new(
        first: PlayerHandle,
        second: PlayerHandle,
        state: Arc<SharedState>,
        config: MatchConfig,
    ) -> Self {
        Self {
            players: [first, second],
            scores: [0, 0],
            state,
            config,
        }
    }

    /// 驱动整局：通知匹配、运行全部回合、发送最终结果
    ///
    /// 结束后两名玩家都不会自动重新入队。
    pub async fn run(mut self) {
        let first = self.players[0].clone();
        let second = self.players[1].clone();

        first.send(ServerMessage::Matched {
            oponente: second.name.clone(),
        });
        second.send(ServerMessage::Matched {
            oponente: first.name.clone(),
        });
        sleep(self.config.start_delay).await;

        for round in 1..=ROUNDS_PER_MATCH {
            self.play_round(round).await;
            sleep(self.config.round_gap).await;
        }

        let mensagem = match self.scores[0].cmp(&self.scores[1]) {
            Ordering::Greater => format!("O vencedor da partida foi {}!", first.name),
            Ordering::Less => format!("O vencedor da partida foi {}!", second.name),
            Ordering::Equal => "A partida terminou em empate!".to_string(),
        };
        first.send(ServerMessage::End {
            mensagem: mensagem.clone(),
        });
        second.send(ServerMessage::End { mensagem });

        info!(
            first = %first.name,
            second = %second.name,
            scores = ?self.scores,
            "对局结束"
        );
    }

    /// 运行一个回合：提示出拳、等到双方出拳或截止、判定并通报结果
    async fn play_round(&mut self, round: u32) {
        let first = self.players[0].clone();
        let second = self.players[1].clone();

        first.send(ServerMessage::Play {});
        second.send(ServerMessage::Play {});

        // 轮询等待双方出拳，以回合截止时间为界
        let deadline = Instant::now() + self.config.round_timeout;
        while !(first.has_move() && second.has_move()) && Instant::now() < deadline {
            sleep(self.config.poll_interval).await;
        }

        // 截止时槽位仍空的一方按超时判定；取出的同时清空槽位
        let first_move = first.take_move().unwrap_or(Move::Timeout);
        let second_move = second.take_move().unwrap_or(Move::Timeout);
        debug!(round, ?first_move, ?second_move, "回合判定");

        match resolve(first_move, second_move) {
            RoundOutcome::FirstWins => {
                self.scores[0] += 1;
                self.state.record_round_win(&first.name);
                first.send(ServerMessage::RoundWon {
                    jogada_oponente: second_move,
                });
                second.send(ServerMessage::RoundLost {
                    jogada_oponente: first_move,
                });
            }
            RoundOutcome::SecondWins => {
                self.scores[1] += 1;
                self.state.record_round_win(&second.name);
                second.send(ServerMessage::RoundWon {
                    jogada_oponente: first_move,
                });
                first.send(ServerMessage::RoundLost {
                    jogada_oponente: second_move,
                });
            }
            RoundOutcome::NoWinner => {
                first.send(ServerMessage::RoundTied {
                    jogada_oponente: second_move,
                });
                second.send(ServerMessage::RoundTied {
                    jogada_oponente: first_move,
                });
            }
        }
    }
}
