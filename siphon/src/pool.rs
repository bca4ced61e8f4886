//! # **siphon** 工作者池

use crate::{
    domain::{PartitionStream, SinkWriter},
    worker::{PartitionWorker, WorkerStats},
};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// 工作者池，每条分区流对应一个工作者
pub struct WorkerPool {
    workers: usize,
    finished: usize,
    interrupted: bool,
    tasks: JoinSet<WorkerStats>,
}

impl WorkerPool {
    /// 按分区流返回顺序编号 `0..N`，立即并发启动全部工作者
    pub fn spawn<S: SinkWriter>(streams: Vec<PartitionStream>, sink: Arc<S>, base: &str) -> Self {
        let mut tasks = JoinSet::new();
        let workers = streams.len();
        for (index, stream) in streams.into_iter().enumerate() {
            let worker = PartitionWorker::new(index, base, stream, Arc::clone(&sink));
            tasks.spawn(worker.run());
        }
        info!("成功启动 {workers} 个分区工作者");
        Self {
            workers,
            finished: 0,
            interrupted: false,
            tasks,
        }
    }

    /// 工作者数量
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 已结束的工作者数量
    pub fn finished(&self) -> usize {
        self.finished
    }

    /// 等待所有工作者结束，至多等待 `timeout`
    ///
    /// 全部在时限内正常结束时返回 `true`。任一工作者以 `JoinError` 结束
    /// （如发生 panic，包括关闭前就已 panic 的工作者）时返回 `false`。
    /// 超时不强制取消，未结束的工作者转为后台运行，直到观察到分区流结束。
    pub async fn await_all(&mut self, timeout: Duration) -> bool {
        let tasks = &mut self.tasks;
        let finished = &mut self.finished;
        let interrupted = &mut self.interrupted;
        let drained = tokio::time::timeout(timeout, async {
            while let Some(result) = tasks.join_next().await {
                match result {
                    Ok(stats) => {
                        *finished += 1;
                        info!(
                            worker = stats.index,
                            received = stats.received,
                            written = stats.written,
                            failed = stats.failed,
                            "工作者已结束"
                        );
                    }
                    Err(e) => {
                        *interrupted = true;
                        error!("关闭期间工作者被中断：{e}");
                    }
                }
            }
        })
        .await
        .is_ok();

        if !drained {
            warn!(
                pending = self.tasks.len(),
                "等待工作者结束超时，非正常退出"
            );
            self.tasks.detach_all();
        }
        drained && !self.interrupted
    }
}
