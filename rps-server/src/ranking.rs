//! 排行榜
//!
//! 名字 -> 累计回合胜场。计数只增不减，无淘汰，进程生命周期内常驻；
//! 记录的是回合胜场，不是整局胜场。

use std::collections::HashMap;

use protocol::RankingEntry;

/// 排行榜
#[derive(Debug, Default)]
pub struct Ranking {
    wins: HashMap<String, u32>,
}

impl Ranking {
    pub fn new() -> Self {
        Self {
            wins: HashMap::new(),
        }
    }

    /// 确保条目存在（初始 0 胜），不重置已有计数
    pub fn ensure(&mut self, name: &str) {
        self.wins.entry(name.to_string()).or_insert(0);
    }

    /// 回合胜场 +1，条目不存在时按 0 创建后再加
    pub fn increment(&mut self, name: &str) {
        *self.wins.entry(name.to_string()).or_insert(0) += 1;
    }

    /// 某玩家当前胜场
    pub fn get(&self, name: &str) -> u32 {
        self.wins.get(name).copied().unwrap_or(0)
    }

    /// 时点快照，按胜场降序、同胜场按名字升序排列
    pub fn snapshot(&self) -> Vec<RankingEntry> {
        let mut entries: Vec<RankingEntry> = self
            .wins
            .iter()
            .map(|(nome, &vitorias)| RankingEntry {
                nome: nome.clone(),
                vitorias,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.vitorias
                .cmp(&a.vitorias)
                .then_with(|| a.nome.cmp(&b.nome))
        });
        entries
    }
}
