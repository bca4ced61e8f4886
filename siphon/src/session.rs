//! # **siphon** 会话
//!
//! 会话持有传输与工作者池，负责启动与关闭协议：
//! 关闭时先断开传输，使所有分区流结束，再有限期地等待工作者退出。

use crate::{
    config::SessionConfig,
    domain::{SinkWriter, StreamTransport},
    errors::StartError,
    pool::WorkerPool,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::{Mutex, watch};
use tracing::{Span, info, instrument, warn};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 已创建
    Created,
    /// 运行中
    Running,
    /// 关闭中
    ShuttingDown,
    /// 已停止
    Stopped,
}

/// 关闭报告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// 所有工作者均在时限内结束
    pub clean: bool,
    /// 工作者数量
    pub workers: usize,
    /// 时限内结束的工作者数量
    pub finished: usize,
}

struct Lifecycle {
    state: SessionState,
    workers: usize,
    pool: Option<WorkerPool>,
}

/// 消费会话
pub struct Session<T, S> {
    config: SessionConfig,
    transport: T,
    sink: Arc<S>,
    lifecycle: Mutex<Lifecycle>,
    report: watch::Sender<Option<ShutdownReport>>,
}

impl<T, S> Session<T, S>
where
    T: StreamTransport,
    S: SinkWriter,
{
    /// 构造函数
    pub fn new(config: SessionConfig, transport: T, sink: S) -> Self {
        Self {
            config,
            transport,
            sink: Arc::new(sink),
            lifecycle: Mutex::new(Lifecycle {
                state: SessionState::Created,
                workers: 0,
                pool: None,
            }),
            report: watch::Sender::new(None),
        }
    }

    /// 会话配置
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 消息流传输
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 持久化目标
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 当前状态
    pub async fn state(&self) -> SessionState {
        self.lifecycle.lock().await.state
    }

    /// 已启动的工作者数量
    pub async fn workers(&self) -> usize {
        self.lifecycle.lock().await.workers
    }

    /// 启动会话，不等待工作者结束
    ///
    /// 工作者数量以传输实际返回的分区流为准。启动失败时会话保持 `Created`。
    #[instrument(name = "start_session", skip(self), fields(topic = %self.config.topic, parallelism = self.config.parallelism, workers))]
    pub async fn start(&self) -> Result<(), StartError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.state != SessionState::Created {
            return Err(StartError::AlreadyStarted(lifecycle.state));
        }
        let requested = self.config.parallelism;
        if requested == 0 {
            return Err(StartError::InvalidParallelism(requested));
        }

        let topic = &self.config.topic;
        let streams = self.transport.streams(topic, requested).await?;
        if streams.is_empty() {
            return Err(StartError::NoPartitions(topic.clone()));
        }
        if streams.len() < requested {
            warn!("期望 {requested} 条分区流，实际获得 {} 条", streams.len());
        }
        Span::current().record("workers", streams.len());

        let pool = WorkerPool::spawn(streams, Arc::clone(&self.sink), &self.config.sink_base_path);
        lifecycle.workers = pool.workers();
        lifecycle.pool = Some(pool);
        lifecycle.state = SessionState::Running;
        info!("成功启动会话");
        Ok(())
    }

    /// 按配置的时限关闭会话
    pub async fn close(&self) -> ShutdownReport {
        self.shutdown(self.config.shutdown_timeout()).await
    }

    /// 关闭会话
    ///
    /// 先断开传输再等待工作者，至多等待 `timeout`。等待期间不持有生命周期锁，
    /// 状态可观察到 `ShuttingDown`。重复或并发调用均返回首次关闭的报告。
    #[instrument(name = "shutdown_session", skip(self), fields(topic = %self.config.topic))]
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownReport {
        let pool = {
            let mut lifecycle = self.lifecycle.lock().await;
            let state = lifecycle.state;
            if matches!(state, SessionState::ShuttingDown | SessionState::Stopped) {
                drop(lifecycle);
                return self.stopped().await;
            }
            lifecycle.state = SessionState::ShuttingDown;
            lifecycle.pool.take()
        };

        info!("开始关闭会话");
        self.transport.disconnect();
        let report = match pool {
            Some(mut pool) => {
                let clean = pool.await_all(timeout).await;
                ShutdownReport {
                    clean,
                    workers: pool.workers(),
                    finished: pool.finished(),
                }
            }
            None => ShutdownReport {
                clean: true,
                workers: 0,
                finished: 0,
            },
        };

        self.lifecycle.lock().await.state = SessionState::Stopped;
        self.report.send_replace(Some(report));
        if report.clean {
            info!("会话正常关闭");
        } else {
            warn!(
                workers = report.workers,
                finished = report.finished,
                "会话非正常关闭"
            );
        }
        report
    }

    /// 等待会话停止，返回关闭报告
    pub async fn stopped(&self) -> ShutdownReport {
        let mut rx = self.report.subscribe();
        loop {
            let current = *rx.borrow_and_update();
            if let Some(report) = current {
                return report;
            }
            if rx.changed().await.is_err() {
                return ShutdownReport {
                    clean: false,
                    workers: 0,
                    finished: 0,
                };
            }
        }
    }
}
