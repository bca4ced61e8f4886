//! 内部单元测试

mod sink_test;

use crate::test_utils::{MemoryTransport, RecordingSink, partition};
use std::sync::{Arc, LazyLock};
use tracing::{Level, info};
use tracing_subscriber::fmt;

static INTERNAL_SETUP: LazyLock<()> = LazyLock::new(|| {
    let _ = fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
    info!("启用 {} 测试日志输出", Level::DEBUG);
});
