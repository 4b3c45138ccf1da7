//! 协议常量

use std::time::Duration;

/// 服务器默认监听端口
pub const DEFAULT_PORT: u16 = 12345;

/// 单帧最大字节数（含结尾换行符）
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// 客户端建立连接超时
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// 每局回合数
pub const ROUNDS_PER_MATCH: u32 = 3;

/// 回合默认截止时间（从回合开始计）
pub const ROUND_TIMEOUT: Duration = Duration::from_secs(300);
