use crate::{domain::SinkWriter, errors::SinkError};
use reqwest::{Client, Response, StatusCode, Url, header::LOCATION, redirect::Policy};
use std::collections::HashMap;
use tracing::debug;

/// WebHDFS 追加写入
///
/// 追加分两步：先向 namenode 发起 `APPEND`，再把数据写到重定向的 datanode。
/// 目标文件不存在时改用 `CREATE`。
#[derive(Debug, Clone)]
pub struct WebHdfsSink {
    client: Client,
    namenode: Url,
    user: Option<String>,
    delegation: Option<String>,
}

impl WebHdfsSink {
    /// 构造函数
    pub fn new(
        namenode: &str,
        user: Option<String>,
        delegation: Option<String>,
    ) -> Result<Self, SinkError> {
        let namenode = Url::parse(namenode)
            .map_err(|e| SinkError::Credentials(format!("namenode 地址'{namenode}'无效：{e}")))?;
        if namenode.cannot_be_a_base() {
            return Err(SinkError::Credentials(format!(
                "namenode 地址'{namenode}'无效"
            )));
        }
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self {
            client,
            namenode,
            user,
            delegation,
        })
    }

    /// 从凭据构建，识别 `namenode`、`user` 与 `delegation`，其余键不使用
    pub fn from_credentials(credentials: &HashMap<String, String>) -> Result<Self, SinkError> {
        let namenode = credentials
            .get("namenode")
            .ok_or_else(|| SinkError::Credentials("缺少'namenode'".to_string()))?;
        Self::new(
            namenode,
            credentials.get("user").cloned(),
            credentials.get("delegation").cloned(),
        )
    }

    pub(crate) fn url(&self, path: &str, op: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.namenode.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["webhdfs", "v1"])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("op", op);
            for (key, value) in extra {
                query.append_pair(key, value);
            }
            if let Some(user) = &self.user {
                query.append_pair("user.name", user);
            }
            if let Some(token) = &self.delegation {
                query.append_pair("delegation", token);
            }
        }
        url
    }

    async fn create(&self, path: &str, data: &[u8]) -> Result<(), SinkError> {
        debug!("目标文件{path}不存在，创建文件");
        let url = self.url(path, "CREATE", &[("overwrite", "false")]);
        let resp = self.client.put(url).send().await?;
        let location = redirect(resp).await?;
        let resp = self.client.put(location).body(data.to_vec()).send().await?;
        expect(resp, StatusCode::CREATED).await
    }
}

impl SinkWriter for WebHdfsSink {
    async fn append(&self, path: &str, data: &[u8]) -> Result<(), SinkError> {
        let resp = self.client.post(self.url(path, "APPEND", &[])).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return self.create(path, data).await;
        }
        let location = redirect(resp).await?;
        let resp = self.client.post(location).body(data.to_vec()).send().await?;
        expect(resp, StatusCode::OK).await
    }
}

async fn redirect(resp: Response) -> Result<Url, SinkError> {
    if !resp.status().is_redirection() {
        return Err(rejected(resp).await);
    }
    let location = resp
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| SinkError::Http("重定向响应缺少 Location".to_string()))?;
    Url::parse(location).map_err(|e| SinkError::Http(format!("重定向地址'{location}'无效：{e}")))
}

async fn expect(resp: Response, status: StatusCode) -> Result<(), SinkError> {
    if resp.status() == status {
        Ok(())
    } else {
        Err(rejected(resp).await)
    }
}

async fn rejected(resp: Response) -> SinkError {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    SinkError::Rejected { status, message }
}
