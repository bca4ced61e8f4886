//! Kafka 到 HDFS 的消费入口
//!
//! 启动与关闭由调用方显式分步调用：启动后立即返回，不等待工作者结束。

use crate::transport::KafkaTransport;
use siphon::{
    Session, SessionState, ShutdownReport, SinkWriter, StreamTransport,
    config::{SessionConfig, build_config},
    errors::StartError,
    sink::Sink,
};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

/// 启动成功时的状态
pub const SUCCESS: &str = "成功";

/// 入口会话类型
pub type HdfsSession = Session<KafkaTransport, Sink>;

static SESSION: SessionSlot<KafkaTransport, Sink> = SessionSlot::new();

/// 当前会话槽位
///
/// 至多持有一个会话。运行中的会话阻止新的启动，已停止的会话被新会话替换。
pub struct SessionSlot<T, S> {
    current: Mutex<Option<Arc<Session<T, S>>>>,
}

impl<T, S> Default for SessionSlot<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> SessionSlot<T, S> {
    /// 构造空槽位
    pub const fn new() -> Self {
        Self {
            current: Mutex::const_new(None),
        }
    }
}

impl<T, S> SessionSlot<T, S>
where
    T: StreamTransport,
    S: SinkWriter,
{
    /// 当前会话
    pub async fn current(&self) -> Option<Arc<Session<T, S>>> {
        self.current.lock().await.clone()
    }

    /// 构造并启动新会话
    ///
    /// 仅当槽位为空或当前会话已停止时才调用 `build`。启动失败时槽位保持不变。
    pub async fn start<F>(&self, build: F) -> Result<Arc<Session<T, S>>, StartError>
    where
        F: FnOnce() -> Result<Session<T, S>, StartError>,
    {
        let mut slot = self.current.lock().await;
        if let Some(current) = slot.as_ref() {
            let state = current.state().await;
            if state != SessionState::Stopped {
                return Err(StartError::AlreadyStarted(state));
            }
            info!("上一会话已停止，创建新的会话");
        }

        let session = Arc::new(build()?);
        session.start().await?;

        let watcher = Arc::clone(&session);
        tokio::spawn(async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => {
                        info!("收到 Ctrl-C 信号");
                        watcher.close().await;
                    }
                    Err(e) => error!("监听 Ctrl-C 信号失败: {e}"),
                },
                _ = watcher.stopped() => (),
            }
        });

        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// 按配置时限关闭当前会话，槽位为空时返回 `None`
    pub async fn shutdown(&self) -> Option<ShutdownReport> {
        match self.current().await {
            Some(session) => Some(session.close().await),
            None => None,
        }
    }

    /// 等待当前会话停止，槽位为空时返回 `None`
    pub async fn all_done(&self) -> Option<ShutdownReport> {
        match self.current().await {
            Some(session) => {
                let report = session.stopped().await;
                info!("消费会话已停止");
                Some(report)
            }
            None => None,
        }
    }
}

/// 加载配置并启动会话，返回状态描述
pub async fn start_hdfs() -> String {
    match load_and_start().await {
        Ok(_) => SUCCESS.to_string(),
        Err(e) => {
            error!("启动消费会话失败：{e}");
            e.to_string()
        }
    }
}

async fn load_and_start() -> Result<Arc<HdfsSession>, StartError> {
    let config = build_config(PathBuf::from(env!("CARGO_MANIFEST_DIR")))?;
    let cfg = SessionConfig::load(&config)?;
    start_with(cfg).await
}

/// 按给定配置启动会话
///
/// 已有会话在运行时拒绝启动；已停止的会话被全新的独立会话替换。
#[instrument(name = "start_with", skip_all, fields(topic = %cfg.topic))]
pub async fn start_with(cfg: SessionConfig) -> Result<Arc<HdfsSession>, StartError> {
    SESSION
        .start(|| {
            let sink = Sink::from_config(&cfg.sink)?;
            let transport = KafkaTransport::new(&cfg);
            Ok(Session::new(cfg, transport, sink))
        })
        .await
}

/// 关闭当前会话，未启动过会话时返回 `None`
pub async fn shutdown_hdfs() -> Option<ShutdownReport> {
    SESSION.shutdown().await
}

/// 等待当前会话停止
pub async fn all_done() -> Option<ShutdownReport> {
    SESSION.all_done().await
}
