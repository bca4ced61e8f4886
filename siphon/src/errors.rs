//! # **siphon** 错误定义

use crate::session::SessionState;
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置加载错误
    #[error("配置加载错误：{0}")]
    Load(#[from] config::ConfigError),
    /// 配置验证错误
    #[error("配置'{section}'验证错误：{message}")]
    Validation {
        /// 配置节
        section: String,
        /// 错误信息
        message: String,
    },
}

/// 消息流传输错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// 连接失败
    #[error("连接消息流失败：{0}")]
    Connect(String),
    /// 获取元数据失败
    #[error("获取主题元数据失败：{0}")]
    Metadata(String),
    /// 主题不存在或没有可用分区
    #[error("主题'{0}'不存在或没有可用分区")]
    TopicNotFound(String),
}

/// 持久化写入错误
#[derive(Debug, Error)]
pub enum SinkError {
    /// 本地文件错误
    #[error("文件写入错误")]
    Io(#[from] std::io::Error),
    /// 请求错误
    #[error("请求错误：{0}")]
    Http(String),
    /// 存储服务拒绝写入
    #[error("存储服务拒绝写入，状态码 {status}：{message}")]
    Rejected {
        /// 状态码
        status: u16,
        /// 响应内容
        message: String,
    },
    /// 凭据缺失或无效
    #[error("存储凭据错误：{0}")]
    Credentials(String),
}

impl From<reqwest::Error> for SinkError {
    fn from(e: reqwest::Error) -> Self {
        SinkError::Http(e.to_string())
    }
}

/// 会话启动错误
#[derive(Debug, Error)]
pub enum StartError {
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 并行度非法
    #[error("并行度必须为正整数，实际为 {0}")]
    InvalidParallelism(usize),
    /// 消息流传输错误
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// 持久化目标构建错误
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// 没有获得任何分区流
    #[error("主题'{0}'没有可消费的分区流")]
    NoPartitions(String),
    /// 会话不在可启动状态
    #[error("会话不可重复启动，当前状态：{0:?}")]
    AlreadyStarted(SessionState),
}
