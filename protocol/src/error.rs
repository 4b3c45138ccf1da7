//! 错误类型定义

use thiserror::Error;

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 编解码错误（帧内容不合法或类型码无法识别）
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,
}

impl ProtocolError {
    /// 是否为单帧解码失败
    ///
    /// 解码失败只影响出错的那一帧，读取方可以丢弃该帧后继续读
    /// 后续已缓冲的帧；其余错误都属于连接级故障。
    pub fn is_decode_error(&self) -> bool {
        matches!(self, ProtocolError::Json(_))
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
