//! # **siphon** 配置
//!
//! 配置在构造会话时一次性加载并验证，之后不可变。

use crate::errors::ConfigError;
use config::{Case, Config, Environment, File};
use serde::Deserialize;
use std::{collections::HashMap, path::PathBuf, time::Duration};
use validator::{Validate, ValidationError};

/// 构建分层配置源
///
/// 依次叠加 `config/default`、`config/{SIPHON_ENV}` 与前缀为 `SIPHON` 的环境变量。
/// 环境变量键转换为驼峰形式，如 `SIPHON__GROUP_ID` 对应 `groupId`。
pub fn build_config(crate_dir: PathBuf) -> Result<Config, ConfigError> {
    let config_root = std::env::var("SIPHON_CONFIG_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| crate_dir.join("config"));
    let env = std::env::var("SIPHON_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = Config::builder()
        .add_source(File::from(config_root.join("default")).required(false))
        .add_source(File::from(config_root.join(env)).required(false))
        .add_source(
            Environment::with_prefix("SIPHON")
                .separator("__")
                .convert_case(Case::Camel),
        )
        .build()?;
    Ok(config)
}

/// 会话配置
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// 订阅的主题
    #[validate(length(min = 1))]
    pub topic: String,
    /// 消费组
    #[validate(length(min = 1))]
    pub group_id: String,
    /// 期望的工作者数量
    #[validate(range(min = 1))]
    pub parallelism: usize,
    /// 持久化路径前缀
    #[validate(length(min = 1))]
    pub sink_base_path: String,
    /// 关闭时等待工作者退出的时限（毫秒）
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    /// 消息流连接配置
    #[validate(nested)]
    pub transport: TransportConfig,
    /// 持久化目标配置
    #[serde(default)]
    pub sink: SinkConfig,
}

fn default_shutdown_timeout_ms() -> u64 {
    5000
}

impl SessionConfig {
    /// 从配置源反序列化并验证
    pub fn load(config: &Config) -> Result<Self, ConfigError> {
        let cfg = config.clone().try_deserialize::<SessionConfig>()?;
        cfg.validate().map_err(|e| ConfigError::Validation {
            section: "session".to_string(),
            message: e.to_string(),
        })?;
        Ok(cfg)
    }

    /// 关闭等待时限
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// 消息流连接配置，对核心逻辑不透明
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportConfig {
    /// 协调者地址
    #[validate(length(min = 1))]
    pub connect: String,
    /// 会话超时（毫秒）
    pub session_timeout_ms: u64,
    /// 自动提交偏移量
    pub auto_commit_enabled: bool,
    /// 无有效偏移量时的起点
    pub auto_offset_reset: String,
    /// 偏移量存储位置
    pub offsets_storage: String,
    /// 双重提交
    pub dual_commit: bool,
    /// 自动提交间隔（毫秒）
    pub auto_commit_interval_ms: u64,
    /// 安全连接配置，缺省时使用非安全连接
    #[validate(nested)]
    pub security: Option<SecurityConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect: String::new(),
            session_timeout_ms: 6000,
            auto_commit_enabled: true,
            auto_offset_reset: "largest".to_string(),
            offsets_storage: "kafka".to_string(),
            dual_commit: false,
            auto_commit_interval_ms: 1000,
            security: None,
        }
    }
}

impl TransportConfig {
    /// 是否启用安全连接
    pub fn secured(&self) -> Option<&SecurityConfig> {
        self.security.as_ref().filter(|s| s.enabled())
    }
}

/// 安全连接配置
#[derive(Debug, Deserialize, Validate, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
#[validate(schema(function = "validate_security"))]
pub struct SecurityConfig {
    /// 安全协议
    pub protocol: Option<String>,
    /// 信任库位置
    pub truststore_location: Option<String>,
    /// 信任库密码
    pub truststore_password: Option<String>,
    /// 密钥库位置
    pub keystore_location: Option<String>,
    /// 密钥库密码
    pub keystore_password: Option<String>,
    /// 私钥密码
    pub key_password: Option<String>,
}

impl SecurityConfig {
    /// 协议非空时启用
    pub fn enabled(&self) -> bool {
        self.protocol.as_deref().is_some_and(|p| !p.is_empty())
    }
}

fn validate_security(cfg: &SecurityConfig) -> Result<(), ValidationError> {
    if !cfg.enabled() {
        return Ok(());
    }
    let required = [
        ("truststoreLocation", &cfg.truststore_location),
        ("truststorePassword", &cfg.truststore_password),
        ("keystoreLocation", &cfg.keystore_location),
        ("keystorePassword", &cfg.keystore_password),
        ("keyPassword", &cfg.key_password),
    ];
    for (name, value) in required {
        if value.as_deref().is_none_or(str::is_empty) {
            let mut err = ValidationError::new("security_incomplete");
            err.message = Some(format!("启用安全连接时缺少'{name}'").into());
            return Err(err);
        }
    }
    Ok(())
}

/// 持久化目标类型
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// 本地文件
    File,
    /// WebHDFS
    #[default]
    WebHdfs,
}

/// 持久化目标配置
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SinkConfig {
    /// 目标类型
    pub kind: SinkKind,
    /// 凭据，原样交给持久化目标
    pub credentials: HashMap<String, String>,
}
