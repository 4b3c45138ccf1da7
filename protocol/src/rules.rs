//! 出拳与回合判定规则

use serde::{Deserialize, Serialize};

/// 一次出拳
///
/// `Timeout` 是哨兵值：回合截止时槽位仍为空的一方按 `Timeout` 判定，
/// 输给任意真实出拳。线上表示为小写字符串（`"roc"` 等）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "roc")]
    Rock,
    #[serde(rename = "pap")]
    Paper,
    #[serde(rename = "sci")]
    Scissors,
    #[serde(rename = "timeout")]
    Timeout,
}

impl Move {
    /// 是否为真实出拳（非超时哨兵）
    pub fn is_real(self) -> bool {
        self != Move::Timeout
    }

    /// 循环规则：石头胜剪刀、剪刀胜布、布胜石头
    fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors)
                | (Move::Scissors, Move::Paper)
                | (Move::Paper, Move::Rock)
        )
    }
}

/// 回合判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// 前者获胜
    FirstWins,
    /// 后者获胜
    SecondWins,
    /// 无胜者（同拳平局或双方超时）
    NoWinner,
}

/// 判定一个回合
///
/// 优先级：单方超时必败 > 双方超时无胜者 > 同拳平局 > 循环规则。
pub fn resolve(first: Move, second: Move) -> RoundOutcome {
    match (first.is_real(), second.is_real()) {
        (true, false) => RoundOutcome::FirstWins,
        (false, true) => RoundOutcome::SecondWins,
        (false, false) => RoundOutcome::NoWinner,
        (true, true) => {
            if first == second {
                RoundOutcome::NoWinner
            } else if first.beats(second) {
                RoundOutcome::FirstWins
            } else {
                RoundOutcome::SecondWins
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Move::*;
    use RoundOutcome::*;

    #[test]
    fn test_cyclic_rule() {
        assert_eq!(resolve(Rock, Scissors), FirstWins);
        assert_eq!(resolve(Scissors, Paper), FirstWins);
        assert_eq!(resolve(Paper, Rock), FirstWins);

        assert_eq!(resolve(Scissors, Rock), SecondWins);
        assert_eq!(resolve(Paper, Scissors), SecondWins);
        assert_eq!(resolve(Rock, Paper), SecondWins);
    }

    #[test]
    fn test_same_move_is_tie() {
        assert_eq!(resolve(Rock, Rock), NoWinner);
        assert_eq!(resolve(Paper, Paper), NoWinner);
        assert_eq!(resolve(Scissors, Scissors), NoWinner);
    }

    #[test]
    fn test_timeout_loses_to_any_real_move() {
        for real in [Rock, Paper, Scissors] {
            assert_eq!(resolve(real, Timeout), FirstWins);
            assert_eq!(resolve(Timeout, real), SecondWins);
        }
    }

    #[test]
    fn test_double_timeout_has_no_winner() {
        assert_eq!(resolve(Timeout, Timeout), NoWinner);
    }

    #[test]
    fn test_wire_representation() {
        assert_eq!(serde_json::to_string(&Rock).unwrap(), r#""roc""#);
        assert_eq!(serde_json::to_string(&Paper).unwrap(), r#""pap""#);
        assert_eq!(serde_json::to_string(&Scissors).unwrap(), r#""sci""#);
        assert_eq!(serde_json::to_string(&Timeout).unwrap(), r#""timeout""#);

        let mv: Move = serde_json::from_str(r#""sci""#).unwrap();
        assert_eq!(mv, Scissors);
    }
}
