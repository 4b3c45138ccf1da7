//! 管理员控制台
//!
//! 从标准输入读取控制命令。`end <消息>` 向所有注册连接广播 END 后
//! 通知接受循环停止；这是硬停止，进行中的对局状态直接丢弃，
//! 不做优雅排空。

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, warn};

use protocol::ServerMessage;

use crate::state::SharedState;

/// 管理员未附带消息时的缺省关闭通知
const DEFAULT_SHUTDOWN_MESSAGE: &str = "O servidor foi encerrado pelo administrador.";

/// 控制台命令
#[derive(Debug, PartialEq, Eq)]
enum AdminCommand {
    /// 广播关闭通知并停止服务器
    End { mensagem: String },
    /// 无法识别的命令
    Unknown(String),
}

/// 解析一行控制台输入；空行返回 None
fn parse(line: &str) -> Option<AdminCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    if command.eq_ignore_ascii_case("end") {
        let mensagem = if rest.is_empty() {
            DEFAULT_SHUTDOWN_MESSAGE.to_string()
        } else {
            rest.to_string()
        };
        Some(AdminCommand::End { mensagem })
    } else {
        Some(AdminCommand::Unknown(command.to_string()))
    }
}

/// 控制台循环
///
/// 收到关闭命令后通过 `shutdown` 通知接受循环停止。标准输入到达
/// EOF 时发送端随任务结束而关闭，同样会停止服务。
pub async fn run(state: Arc<SharedState>, shutdown: mpsc::Sender<()>) {
    info!("控制台已启动，输入 `end <消息>` 关闭服务器");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse(&line) {
            Some(AdminCommand::End { mensagem }) => {
                let notified = state.broadcast(ServerMessage::End { mensagem });
                info!(notified, "收到关闭命令，已广播 END");

                // 留出写端任务冲刷消息的时间
                sleep(Duration::from_secs(1)).await;
                let _ = shutdown.send(()).await;
                return;
            }
            Some(AdminCommand::Unknown(command)) => {
                warn!(command, "未知控制台命令");
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_end_with_message() {
        assert_eq!(
            parse("end manutenção programada"),
            Some(AdminCommand::End {
                mensagem: "manutenção programada".to_string()
            })
        );
    }

    #[test]
    fn test_parse_end_without_message_uses_default() {
        assert_eq!(
            parse("end"),
            Some(AdminCommand::End {
                mensagem: DEFAULT_SHUTDOWN_MESSAGE.to_string()
            })
        );
        assert_eq!(
            parse("END  "),
            Some(AdminCommand::End {
                mensagem: DEFAULT_SHUTDOWN_MESSAGE.to_string()
            })
        );
    }

    #[test]
    fn test_parse_unknown_and_empty() {
        assert_eq!(
            parse("restart agora"),
            Some(AdminCommand::Unknown("restart".to_string()))
        );
        assert_eq!(parse("   "), None);
    }
}
