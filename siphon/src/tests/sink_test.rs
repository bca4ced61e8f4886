use super::*;
use crate::{
    config::{SinkConfig, SinkKind},
    domain::SinkWriter,
    errors::SinkError,
    sink::{FileSink, Sink, WebHdfsSink},
};
use std::{collections::HashMap, sync::Mutex};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use uuid::Uuid;

#[tokio::test]
async fn file_sink_appends_without_overwrite() {
    LazyLock::force(&INTERNAL_SETUP);
    let root = std::env::temp_dir().join(format!("siphon-{}", Uuid::new_v4()));
    let sink = FileSink::new(Some(root.clone()));

    sink.append("/base/0", b"first\n").await.unwrap();
    sink.append("/base/0", b"second\n").await.unwrap();
    sink.append("/base/1", b"other\n").await.unwrap();

    let content = tokio::fs::read_to_string(root.join("base/0")).await.unwrap();
    assert_eq!(content, "first\nsecond\n");
    let content = tokio::fs::read_to_string(root.join("base/1")).await.unwrap();
    assert_eq!(content, "other\n");
    let _ = tokio::fs::remove_dir_all(root).await;
}

#[test]
fn sink_from_config() {
    let file = SinkConfig {
        kind: SinkKind::File,
        credentials: HashMap::new(),
    };
    assert!(matches!(Sink::from_config(&file), Ok(Sink::File(_))));

    let webhdfs = SinkConfig {
        kind: SinkKind::WebHdfs,
        credentials: HashMap::new(),
    };
    assert!(matches!(
        Sink::from_config(&webhdfs),
        Err(SinkError::Credentials(_))
    ));
}

#[test]
fn webhdfs_url_carries_credentials() {
    let sink = WebHdfsSink::new(
        "http://namenode:9870",
        Some("hdfs".to_string()),
        Some("token".to_string()),
    )
    .unwrap();
    let url = sink.url("/data/orders/0", "APPEND", &[]);
    assert_eq!(
        url.as_str(),
        "http://namenode:9870/webhdfs/v1/data/orders/0?op=APPEND&user.name=hdfs&delegation=token"
    );
    let url = sink.url("data/orders/1", "CREATE", &[("overwrite", "false")]);
    assert_eq!(url.path(), "/webhdfs/v1/data/orders/1");
    assert_eq!(
        url.query(),
        Some("op=CREATE&overwrite=false&user.name=hdfs&delegation=token")
    );
}

#[test]
fn webhdfs_rejects_invalid_namenode() {
    assert!(matches!(
        WebHdfsSink::new("not a url", None, None),
        Err(SinkError::Credentials(_))
    ));
}

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    body: Vec<u8>,
}

struct FakeNamenode {
    base: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeNamenode {
    async fn start(exists: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let exists = Arc::new(Mutex::new(exists));
        let recorded = Arc::clone(&requests);
        let location = base.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let exists = Arc::clone(&exists);
                let location = location.clone();
                tokio::spawn(async move {
                    handle(socket, recorded, exists, location).await;
                });
            }
        });
        Self { base, requests }
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    mut socket: TcpStream,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    exists: Arc<Mutex<bool>>,
    base: String,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap().split_whitespace();
    let method = request_line.next().unwrap().to_string();
    let target = request_line.next().unwrap().to_string();
    let length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .map_or(0, |(_, v)| v.trim().parse::<usize>().unwrap());
    while buf.len() < head_end + length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = buf[head_end..].to_vec();
    recorded.lock().unwrap().push(Recorded {
        method: method.clone(),
        target: target.clone(),
        body,
    });

    let path = target.split('?').next().unwrap_or_default().to_string();
    let response = match (method.as_str(), target.contains("/datanode/")) {
        ("POST", false) if !*exists.lock().unwrap() => {
            reply("404 Not Found", None, "FileNotFoundException")
        }
        ("POST", false) | ("PUT", false) => {
            let location = format!("{base}/datanode{path}");
            reply("307 Temporary Redirect", Some(&location), "")
        }
        ("POST", true) => reply("200 OK", None, ""),
        ("PUT", true) => {
            *exists.lock().unwrap() = true;
            reply("201 Created", None, "")
        }
        _ => reply("400 Bad Request", None, ""),
    };
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn reply(status: &str, location: Option<&str>, body: &str) -> String {
    let location = location
        .map(|l| format!("Location: {l}\r\n"))
        .unwrap_or_default();
    format!(
        "HTTP/1.1 {status}\r\n{location}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

#[tokio::test]
async fn webhdfs_appends_through_redirect() {
    LazyLock::force(&INTERNAL_SETUP);
    let namenode = FakeNamenode::start(true).await;
    let sink = WebHdfsSink::new(&namenode.base, Some("hdfs".to_string()), None).unwrap();

    sink.append("/data/orders/0", b"hello\n").await.unwrap();

    let requests = namenode.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(
        requests[0].target,
        "/webhdfs/v1/data/orders/0?op=APPEND&user.name=hdfs"
    );
    assert!(requests[0].body.is_empty());
    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].target, "/datanode/webhdfs/v1/data/orders/0");
    assert_eq!(requests[1].body, b"hello\n");
}

#[tokio::test]
async fn webhdfs_creates_missing_file() {
    LazyLock::force(&INTERNAL_SETUP);
    let namenode = FakeNamenode::start(false).await;
    let sink = WebHdfsSink::new(&namenode.base, None, None).unwrap();

    sink.append("/data/orders/1", b"first\n").await.unwrap();
    sink.append("/data/orders/1", b"second\n").await.unwrap();

    let methods: Vec<(String, bool)> = namenode
        .requests()
        .into_iter()
        .map(|r| (r.method, r.target.contains("op=CREATE")))
        .collect();
    assert_eq!(
        methods,
        vec![
            ("POST".to_string(), false),
            ("PUT".to_string(), true),
            ("PUT".to_string(), false),
            ("POST".to_string(), false),
            ("POST".to_string(), false),
        ]
    );
    let requests = namenode.requests();
    assert_eq!(requests[2].body, b"first\n");
    assert_eq!(requests[4].body, b"second\n");
}
