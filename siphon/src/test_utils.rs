//! # **siphon** 测试工具
//!
//! 内存传输与记录写入，用于不依赖外部服务的测试。

mod sink;
mod transport;

pub use sink::RecordingSink;
pub use transport::MemoryTransport;

use crate::domain::Message;
use bytes::Bytes;

/// 构造一条测试消息
pub fn message(partition: i32, offset: i64, value: &str) -> Message {
    Message {
        key: String::new(),
        value: Bytes::copy_from_slice(value.as_bytes()),
        partition,
        offset,
    }
}

/// 构造一个分区的连续消息，值为 `p{partition}-m{offset}`
pub fn partition(partition: i32, count: i64) -> Vec<Message> {
    (0..count)
        .map(|offset| message(partition, offset, &format!("p{partition}-m{offset}")))
        .collect()
}
