use rdkafka::ClientConfig;
use siphon::config::SessionConfig;
use tracing::warn;

/// 由会话配置构建 Kafka 消费者配置
pub fn client_config(cfg: &SessionConfig) -> ClientConfig {
    let transport = &cfg.transport;
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", &transport.connect)
        .set("group.id", &cfg.group_id)
        .set("session.timeout.ms", transport.session_timeout_ms.to_string())
        .set("enable.auto.commit", transport.auto_commit_enabled.to_string())
        .set(
            "auto.commit.interval.ms",
            transport.auto_commit_interval_ms.to_string(),
        )
        .set("auto.offset.reset", &transport.auto_offset_reset);

    if let Some(security) = transport.secured() {
        let settings = [
            ("security.protocol", &security.protocol),
            ("ssl.ca.location", &security.truststore_location),
            ("ssl.keystore.location", &security.keystore_location),
            ("ssl.keystore.password", &security.keystore_password),
            ("ssl.key.password", &security.key_password),
        ];
        for (key, value) in settings {
            if let Some(value) = value {
                config.set(key, value);
            }
        }
    }

    if transport.offsets_storage != "kafka" {
        warn!(
            "偏移量只能存储在 Kafka，忽略 offsets_storage = {}",
            transport.offsets_storage
        );
    }
    if transport.dual_commit {
        warn!("Kafka 消费者不支持双重提交，忽略 dual_commit");
    }
    config
}
