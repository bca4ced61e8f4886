use crate::{domain::SinkWriter, errors::SinkError};
use std::{collections::HashMap, path::PathBuf};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

/// 本地文件追加写入
///
/// 写入目标路径作为文件路径，配置了 `root` 时挂在其下。
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    root: Option<PathBuf>,
}

impl FileSink {
    /// 构造函数
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// 从凭据构建，仅识别 `root`
    pub fn from_credentials(credentials: &HashMap<String, String>) -> Self {
        Self::new(credentials.get("root").map(PathBuf::from))
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path.trim_start_matches('/')),
            None => PathBuf::from(path),
        }
    }
}

impl SinkWriter for FileSink {
    async fn append(&self, path: &str, data: &[u8]) -> Result<(), SinkError> {
        let path = self.resolve(path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }
}
