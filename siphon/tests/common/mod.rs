#![allow(dead_code)]

use siphon::config::{SessionConfig, SinkConfig, TransportConfig};
use std::sync::LazyLock;
use tracing::{Level, info};
use tracing_subscriber::fmt;

pub(crate) static EXTERNAL_SETUP: LazyLock<()> = LazyLock::new(|| {
    let _ = fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
    info!("启用 {} 测试日志输出", Level::DEBUG);
});

pub(crate) fn session_config(parallelism: usize) -> SessionConfig {
    SessionConfig {
        topic: "orders".to_string(),
        group_id: "group1".to_string(),
        parallelism,
        sink_base_path: "base".to_string(),
        shutdown_timeout_ms: 5000,
        transport: TransportConfig {
            connect: "localhost:9092".to_string(),
            ..Default::default()
        },
        sink: SinkConfig::default(),
    }
}
