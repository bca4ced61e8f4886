mod common;

use crate::common::EXTERNAL_SETUP;
use siphon_kafka::{all_done, app::SUCCESS, shutdown_hdfs, start_hdfs};
use std::sync::LazyLock;
use tokio::time::{Duration, timeout};
use uuid::Uuid;

const INVALID: &str = r#"
topic = "siphon-events"
groupId = "siphon-hdfs"
parallelism = 0
sinkBasePath = "/tmp/siphon"

[transport]
connect = "localhost:9092"

[sink]
kind = "file"
"#;

#[tokio::test]
async fn start_hdfs_returns_error_status_without_session() {
    LazyLock::force(&EXTERNAL_SETUP);
    let root = std::env::temp_dir().join(format!("siphon-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("default.toml"), INVALID).unwrap();
    // SAFETY: 本测试二进制中唯一的测试，设置时没有其他线程读取环境变量
    unsafe { std::env::set_var("SIPHON_CONFIG_ROOT", &root) };

    assert_eq!(shutdown_hdfs().await, None);
    let status = timeout(Duration::from_secs(1), start_hdfs()).await.unwrap();

    assert_ne!(status, SUCCESS);
    assert!(status.contains("parallelism"), "{status}");
    assert_eq!(shutdown_hdfs().await, None);
    assert_eq!(all_done().await, None);
    std::fs::remove_dir_all(&root).unwrap();
}
