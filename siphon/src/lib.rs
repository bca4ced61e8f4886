//! # **siphon** 核心库
//!
//! 订阅分区消息流，按分区流扇出到固定数量的工作者，
//! 每个工作者把消息追加写入各自的持久化目标。

#![warn(missing_docs)]

pub mod config;
pub mod domain;
pub mod errors;
pub mod pool;
pub mod session;
pub mod sink;
pub mod worker;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
#[cfg(test)]
mod tests;

pub use domain::{Message, PartitionStream, SinkWriter, StreamTransport};
pub use session::{Session, SessionState, ShutdownReport};
