//! # **siphon** 持久化目标

mod file;
mod webhdfs;

pub use file::FileSink;
pub use webhdfs::WebHdfsSink;

use crate::{
    config::{SinkConfig, SinkKind},
    domain::SinkWriter,
    errors::SinkError,
};

/// 按配置选择的持久化目标
pub enum Sink {
    /// 本地文件
    File(FileSink),
    /// WebHDFS
    WebHdfs(WebHdfsSink),
}

impl Sink {
    /// 按配置构建，凭据原样交给具体实现
    pub fn from_config(cfg: &SinkConfig) -> Result<Self, SinkError> {
        match cfg.kind {
            SinkKind::File => Ok(Sink::File(FileSink::from_credentials(&cfg.credentials))),
            SinkKind::WebHdfs => Ok(Sink::WebHdfs(WebHdfsSink::from_credentials(
                &cfg.credentials,
            )?)),
        }
    }
}

impl SinkWriter for Sink {
    async fn append(&self, path: &str, data: &[u8]) -> Result<(), SinkError> {
        match self {
            Sink::File(sink) => sink.append(path, data).await,
            Sink::WebHdfs(sink) => sink.append(path, data).await,
        }
    }
}
