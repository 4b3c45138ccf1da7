//! 消息类型定义
//!
//! 线上格式为每行一个 JSON 对象：`{"type": "<三字母码>", "payload": {...}}`。
//! payload 字段沿用原客户端的葡萄牙语命名，保持线上兼容。

use serde::{Deserialize, Serialize};

use crate::rules::Move;

/// 连接 ID（服务端内部标识一条连接）
pub type ConnId = u64;

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// 玩家名字
    pub nome: String,
    /// 累计回合胜场
    pub vitorias: u32,
}

/// 客户端发送给服务端的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// 报告身份（每条连接仅接受一次，先于其他命令）
    #[serde(rename = "CON")]
    Connect { name: String },

    /// 出石头
    #[serde(rename = "ROC")]
    Rock {},
    /// 出布
    #[serde(rename = "PAP")]
    Paper {},
    /// 出剪刀
    #[serde(rename = "SCI")]
    Scissors {},

    /// 请求排行榜快照
    #[serde(rename = "RAN")]
    Ranking {},

    /// 断开连接
    #[serde(rename = "QUI")]
    Quit {},
}

/// 服务端发送给客户端的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// 匹配成功，携带对手名字
    #[serde(rename = "MAT")]
    Matched { oponente: String },

    /// 轮到出拳
    #[serde(rename = "PLA")]
    Play {},

    /// 回合获胜，携带对手实际出拳
    #[serde(rename = "WIN")]
    RoundWon { jogada_oponente: Move },
    /// 回合落败，携带对手实际出拳
    #[serde(rename = "LOS")]
    RoundLost { jogada_oponente: Move },
    /// 回合平局，携带对手实际出拳
    #[serde(rename = "TIE")]
    RoundTied { jogada_oponente: Move },

    /// 排行榜快照
    #[serde(rename = "RAN")]
    Ranking { ranking: Vec<RankingEntry> },

    /// 对局结果或服务器关闭通知（两者共用同一类型码，
    /// 客户端只能根据内容和上下文区分）
    #[serde(rename = "END")]
    End { mensagem: String },
}
