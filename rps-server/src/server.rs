//! 服务器主循环

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info};

use protocol::{Listener, TcpListener, DEFAULT_PORT};

use crate::admin;
use crate::handler::handle_connection;
use crate::session::{MatchConfig, Matchmaker};
use crate::state::SharedState;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub match_config: MatchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            match_config: MatchConfig::default(),
        }
    }
}

/// 接受循环
///
/// 每条连接分配递增 ID 并交给独立任务处理；收到 shutdown 信号
/// （或其发送端全部关闭）后停止接受并返回，监听套接字随之关闭。
pub async fn serve(
    mut listener: TcpListener,
    state: Arc<SharedState>,
    mut shutdown: mpsc::Receiver<()>,
) -> Result<()> {
    let next_conn_id = AtomicU64::new(1);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok(conn) => {
                        let conn_id = next_conn_id.fetch_add(1, Ordering::SeqCst);
                        tokio::spawn(handle_connection(Arc::clone(&state), conn, conn_id));
                    }
                    Err(e) => error!("接受连接失败: {e}"),
                }
            }
            _ = shutdown.recv() => {
                info!("接受循环停止");
                return Ok(());
            }
        }
    }
}

/// 绑定端口、启动后台任务（匹配循环、控制台），随后进入接受循环
pub async fn run(config: ServerConfig) -> Result<()> {
    let state = Arc::new(SharedState::new());
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr().unwrap_or(addr), "服务器开始监听");

    let matchmaker = Matchmaker::new(Arc::clone(&state), config.match_config.clone());
    tokio::spawn(matchmaker.run());

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    tokio::spawn(admin::run(Arc::clone(&state), shutdown_tx));

    serve(listener, state, shutdown_rx).await
}
