//! Kafka 消息流传输

use crate::config::client_config;
use bytes::Bytes;
use futures::{StreamExt, stream};
use rdkafka::{
    ClientConfig, Message as _,
    consumer::{BaseConsumer, Consumer, StreamConsumer},
    message::BorrowedMessage,
};
use siphon::{
    config::SessionConfig,
    domain::{Message, PartitionStream, StreamTransport},
    errors::TransportError,
};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Kafka 传输
///
/// 断开连接通过 `watch` 通道通知所有分区流，分区流结束后消费者随之关闭。
pub struct KafkaTransport {
    config: ClientConfig,
    timeout: Duration,
    shutdown: watch::Sender<bool>,
}

impl KafkaTransport {
    /// 构造函数
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            config: client_config(cfg),
            timeout: Duration::from_millis(cfg.transport.session_timeout_ms),
            shutdown: watch::Sender::new(false),
        }
    }

    /// 消费者配置
    pub fn client_config(&self) -> &ClientConfig {
        &self.config
    }

    async fn partitions(&self, topic: &str) -> Result<usize, TransportError> {
        let config = self.config.clone();
        let topic = topic.to_string();
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || {
            let client: BaseConsumer = config
                .create()
                .map_err(|e| TransportError::Connect(e.to_string()))?;
            let metadata = client
                .fetch_metadata(Some(topic.as_str()), timeout)
                .map_err(|e| TransportError::Metadata(e.to_string()))?;
            metadata
                .topics()
                .iter()
                .find(|t| t.name() == topic && t.error().is_none())
                .map(|t| t.partitions().len())
                .filter(|count| *count > 0)
                .ok_or_else(|| TransportError::TopicNotFound(topic.clone()))
        })
        .await
        .map_err(|e| TransportError::Metadata(e.to_string()))?
    }

    fn stream(&self, consumer: StreamConsumer) -> PartitionStream {
        let mut shutdown = self.shutdown.subscribe();
        stream::unfold(consumer, |consumer| async move {
            loop {
                match consumer.recv().await.map(|msg| convert(&msg)) {
                    Ok(message) => return Some((message, consumer)),
                    Err(e) => warn!("消息错误：{e}"),
                }
            }
        })
        .take_until(async move {
            let _ = shutdown.wait_for(|closed| *closed).await;
        })
        .boxed()
    }
}

fn convert(msg: &BorrowedMessage<'_>) -> Message {
    Message {
        key: msg
            .key()
            .map(|k| String::from_utf8_lossy(k).into_owned())
            .unwrap_or_default(),
        value: msg.payload().map(Bytes::copy_from_slice).unwrap_or_default(),
        partition: msg.partition(),
        offset: msg.offset(),
    }
}

impl StreamTransport for KafkaTransport {
    #[instrument(name = "kafka_streams", skip(self))]
    async fn streams(
        &self,
        topic: &str,
        parallelism: usize,
    ) -> Result<Vec<PartitionStream>, TransportError> {
        let partitions = self.partitions(topic).await?;
        let count = parallelism.min(partitions);
        debug!("主题共有 {partitions} 个分区，创建 {count} 个消费者");

        let mut streams = Vec::with_capacity(count);
        for _ in 0..count {
            let consumer: StreamConsumer = self
                .config
                .create()
                .map_err(|e| TransportError::Connect(e.to_string()))?;
            consumer
                .subscribe(&[topic])
                .map_err(|e| TransportError::Connect(e.to_string()))?;
            streams.push(self.stream(consumer));
        }
        info!("成功订阅 {topic} 消息流");
        Ok(streams)
    }

    fn disconnect(&self) {
        if !self.shutdown.send_replace(true) {
            info!("断开 Kafka 连接");
        }
    }
}
