//! # **siphon** 特征
//!
//! 消息流传输与持久化写入是两个外部协作者，核心逻辑只依赖这里定义的能力。

use crate::errors::{SinkError, TransportError};
use bytes::Bytes;
use futures::stream::BoxStream;
use std::future::Future;

/// 分区流中的一条消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// 消息键，缺失时为空串
    pub key: String,
    /// 消息体
    pub value: Bytes,
    /// 来源分区
    pub partition: i32,
    /// 分区内偏移量
    pub offset: i64,
}

/// 分区消息流，传输断开后结束
pub type PartitionStream = BoxStream<'static, Message>;

/// 消息流传输特征
pub trait StreamTransport: Send + Sync + 'static {
    /// 订阅主题，获取至多 `parallelism` 条互相独立的分区流
    ///
    /// 返回的流数量由传输层的分区分配决定，可能少于 `parallelism`。
    fn streams(
        &self,
        topic: &str,
        parallelism: usize,
    ) -> impl Future<Output = Result<Vec<PartitionStream>, TransportError>> + Send;

    /// 断开连接，使所有分区流结束
    fn disconnect(&self);
}

/// 持久化写入特征
pub trait SinkWriter: Send + Sync + 'static {
    /// 把数据追加写入路径对应的目标
    fn append(&self, path: &str, data: &[u8])
    -> impl Future<Output = Result<(), SinkError>> + Send;
}
