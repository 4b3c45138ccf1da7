use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use protocol::DEFAULT_PORT;
use rps_server::server::{self, ServerConfig};
use rps_server::session::MatchConfig;

/// 石头剪刀布对战服务器
#[derive(Debug, Parser)]
#[command(name = "rps-server")]
struct Args {
    /// 监听地址
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// 监听端口
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// 回合截止时间（秒）
    #[arg(long, default_value_t = 300)]
    round_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("rps_server=debug".parse()?))
        .init();

    let args = Args::parse();
    info!("石头剪刀布服务端启动中...");

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        match_config: MatchConfig {
            round_timeout: Duration::from_secs(args.round_timeout),
            ..MatchConfig::default()
        },
    };

    server::run(config).await
}
