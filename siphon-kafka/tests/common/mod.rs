#![allow(dead_code)]

use rdkafka::{
    ClientConfig,
    admin::{AdminClient, AdminOptions},
    client::DefaultClientContext,
};
use std::sync::LazyLock;
use tokio::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::fmt;

pub(crate) static BOOTSTRAP: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SIPHON_BOOTSTRAP").unwrap_or_else(|_| "localhost:9092".to_string())
});

pub(crate) static EXTERNAL_SETUP: LazyLock<()> = LazyLock::new(|| {
    let _ = fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
    info!("启用 {} 测试日志输出", Level::DEBUG);
});

pub(crate) static OPTS: LazyLock<AdminOptions> = LazyLock::new(|| {
    AdminOptions::new()
        .operation_timeout(Some(Duration::from_secs(3)))
        .request_timeout(Some(Duration::from_secs(5)))
});

pub(crate) static ADMIN: LazyLock<AdminClient<DefaultClientContext>> =
    LazyLock::new(|| config().create().expect("管理客户端创建失败"));

pub(crate) fn config() -> ClientConfig {
    let mut config = ClientConfig::new();
    config.set("bootstrap.servers", BOOTSTRAP.as_str());
    config
}
