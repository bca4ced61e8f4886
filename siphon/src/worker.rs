//! # **siphon** 分区工作者

use crate::domain::{PartitionStream, SinkWriter};
use bytes::{BufMut, BytesMut};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 工作者退出时的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerStats {
    /// 工作者序号
    pub index: usize,
    /// 拉取的消息数
    pub received: u64,
    /// 写入成功数
    pub written: u64,
    /// 写入失败数
    pub failed: u64,
}

/// 派生工作者的写入目标
#[inline]
pub fn sink_target(base: &str, index: usize) -> String {
    format!("{base}/{index}")
}

/// 分区工作者，独占一条分区流
///
/// 写入失败只记录日志，继续处理下一条消息，不重试也不向上游反压，
/// 因此写入失败的消息会丢失。
pub struct PartitionWorker<S> {
    index: usize,
    target: String,
    stream: PartitionStream,
    sink: Arc<S>,
    stats: WorkerStats,
}

impl<S: SinkWriter> PartitionWorker<S> {
    /// 构造函数
    pub fn new(index: usize, base: &str, stream: PartitionStream, sink: Arc<S>) -> Self {
        Self {
            index,
            target: sink_target(base, index),
            stream,
            sink,
            stats: WorkerStats {
                index,
                ..Default::default()
            },
        }
    }

    /// 写入目标
    pub fn target(&self) -> &str {
        &self.target
    }

    /// 拉取消息直至分区流结束
    #[instrument(name = "partition_worker", skip(self), fields(worker = self.index, path = %self.target))]
    pub async fn run(mut self) -> WorkerStats {
        info!("启动分区工作者");
        let mut record = BytesMut::new();
        while let Some(msg) = self.stream.next().await {
            self.stats.received += 1;
            record.clear();
            record.reserve(msg.value.len() + 1);
            record.put_slice(&msg.value);
            record.put_u8(b'\n');

            match self.sink.append(&self.target, &record).await {
                Ok(()) => {
                    self.stats.written += 1;
                    debug!(
                        count = self.stats.received,
                        partition = msg.partition,
                        offset = msg.offset,
                        key = %msg.key,
                        "消息写入成功"
                    );
                }
                Err(e) => {
                    self.stats.failed += 1;
                    warn!(
                        partition = msg.partition,
                        offset = msg.offset,
                        "消息写入失败：{e}"
                    );
                }
            }
        }
        info!(
            received = self.stats.received,
            written = self.stats.written,
            failed = self.stats.failed,
            "分区流结束，工作者退出"
        );
        self.stats
    }
}
