use crate::{domain::SinkWriter, errors::SinkError};
use bytes::Bytes;
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

/// 记录所有追加调用的写入
///
/// 可以指定某个目标的第 n 次调用失败，或指定目标的写入一直挂起。
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<(String, Bytes)>>,
    calls: Mutex<HashMap<String, usize>>,
    failures: HashSet<(String, usize)>,
    stalls: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingSink {
    /// 构造函数
    pub fn new() -> Self {
        Self::default()
    }

    /// 目标 `path` 的第 `nth` 次调用（从 1 计）失败
    pub fn fail_on(mut self, path: &str, nth: usize) -> Self {
        self.failures.insert((path.to_string(), nth));
        self
    }

    /// 目标 `path` 的写入一直挂起
    pub fn stall_on(mut self, path: &str) -> Self {
        self.stalls.insert(path.to_string());
        self
    }

    /// 每次写入前等待 `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 成功写入的记录，按调用顺序
    pub fn records(&self) -> Vec<(String, Bytes)> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// 写入目标 `path` 的成功记录
    pub fn records_for(&self, path: &str) -> Vec<Bytes> {
        self.records()
            .into_iter()
            .filter(|(p, _)| p == path)
            .map(|(_, data)| data)
            .collect()
    }

    /// 等待成功记录达到 `count` 条，超时返回 `false`
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.records.lock().map_or(0, |r| r.len()) < count {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        true
    }

    /// 所有追加调用次数，含失败与挂起
    pub fn calls(&self) -> usize {
        self.calls
            .lock()
            .map(|c| c.values().sum())
            .unwrap_or_default()
    }
}

impl SinkWriter for RecordingSink {
    async fn append(&self, path: &str, data: &[u8]) -> Result<(), SinkError> {
        let nth = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|e| SinkError::Http(e.to_string()))?;
            let count = calls.entry(path.to_string()).or_default();
            *count += 1;
            *count
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.stalls.contains(path) {
            std::future::pending::<()>().await;
        }
        if self.failures.contains(&(path.to_string(), nth)) {
            return Err(SinkError::Rejected {
                status: 500,
                message: format!("{path} 第 {nth} 次写入失败"),
            });
        }
        self.records
            .lock()
            .map_err(|e| SinkError::Http(e.to_string()))?
            .push((path.to_string(), Bytes::copy_from_slice(data)));
        Ok(())
    }
}
