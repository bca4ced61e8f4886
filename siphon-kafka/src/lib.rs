//! # **siphon** 的 Kafka 实现
//!
//! 同一消费组内为每条分区流创建一个消费者，由组协调者分配互不相交的分区。

pub mod app;
pub mod config;
pub mod transport;

pub use app::{SessionSlot, all_done, shutdown_hdfs, start_hdfs, start_with};
pub use transport::KafkaTransport;
