use crate::{
    domain::{Message, PartitionStream, StreamTransport},
    errors::TransportError,
};
use futures::{StreamExt, stream};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::watch;

/// 内存传输
///
/// 每个分区先交付预置消息，随后保持挂起，直到断开连接才结束。
pub struct MemoryTransport {
    partitions: Mutex<Vec<Vec<Message>>>,
    reachable: bool,
    shutdown: watch::Sender<bool>,
    disconnects: AtomicUsize,
}

impl MemoryTransport {
    /// 构造函数，每个元素是一个分区的消息
    pub fn new(partitions: Vec<Vec<Message>>) -> Self {
        Self {
            partitions: Mutex::new(partitions),
            reachable: true,
            shutdown: watch::Sender::new(false),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// 无法连接的传输
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new(Vec::new())
        }
    }

    /// 断开连接的调用次数
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl StreamTransport for MemoryTransport {
    async fn streams(
        &self,
        topic: &str,
        parallelism: usize,
    ) -> Result<Vec<PartitionStream>, TransportError> {
        if !self.reachable {
            return Err(TransportError::Connect(format!("无法连接主题'{topic}'")));
        }
        let mut partitions = self
            .partitions
            .lock()
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        let count = parallelism.min(partitions.len());
        let streams = partitions
            .drain(..count)
            .map(|messages| {
                let mut rx = self.shutdown.subscribe();
                stream::iter(messages)
                    .chain(stream::pending())
                    .take_until(async move {
                        let _ = rx.wait_for(|closed| *closed).await;
                    })
                    .boxed()
            })
            .collect();
        Ok(streams)
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.shutdown.send_replace(true);
    }
}
