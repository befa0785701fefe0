//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tandem_proxy::config::{ProxyConfig, Role};
use tandem_proxy::{HttpServer, Journal, Shutdown};

/// One request as seen by a mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query.
    pub target: String,
    /// Lowercased header names.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Canned response for a mock server.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub content_encoding: Option<&'static str>,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            content_encoding: None,
            body: body.into().into_bytes(),
        }
    }

    /// Gzip the body and label it `Content-Encoding: gzip`.
    pub fn gzip(mut self) -> Self {
        self.body = gzip(&self.body);
        self.content_encoding = Some("gzip");
        self
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A running mock server and every request it has received.
pub struct MockServer {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a programmable mock server on an ephemeral port.
pub async fn start_mock_server<F>(f: F) -> MockServer
where
    F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        serve_one(socket, f.as_ref(), &recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockServer { addr, requests }
}

async fn serve_one<F>(mut socket: TcpStream, f: &F, recorded: &Mutex<Vec<RecordedRequest>>)
where
    F: Fn(&RecordedRequest) -> MockResponse,
{
    let request = match read_request(&mut socket).await {
        Some(request) => request,
        None => return,
    };
    let response = f(&request);
    recorded.lock().unwrap().push(request);

    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
        response.status,
        reason(response.status),
        response.content_type,
        response.body.len(),
    );
    if let Some(encoding) = response.content_encoding {
        head.push_str(&format!("Content-Encoding: {}\r\n", encoding));
    }
    head.push_str("Connection: close\r\n\r\n");

    let mut raw = head.into_bytes();
    raw.extend_from_slice(&response.body);
    let _ = socket.write_all(&raw).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}

/// A proxy server running on an ephemeral port.
pub struct RunningProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub journal_path: PathBuf,
    pub server: tokio::task::JoinHandle<()>,
}

impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.server).await;
        let _ = std::fs::remove_file(&self.journal_path);
    }
}

pub fn temp_log_path(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}.log", prefix, uuid::Uuid::new_v4()))
}

/// Build and start a server for `config`.
pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let journal_path = temp_log_path("tandem-it");
    let journal = Arc::new(Journal::open(&journal_path).await.unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, journal).unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    RunningProxy {
        addr,
        shutdown,
        journal_path,
        server,
    }
}

/// Backend-tier config pointing at mock origins.
pub fn backend_config(origin: &str, asset_origin: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.role = Some(Role::Backend);
    config.backend.target_url = origin.to_string();
    config.backend.asset_origin_url = asset_origin.to_string();
    config.backend.asset_proxy_url = "https://cdn.other".to_string();
    config.timeouts.connect_secs = 2;
    config.timeouts.request_secs = 5;
    config
}

/// Host-tier config balancing over `backends`.
pub fn host_config(backends: &[String]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.role = Some(Role::Host);
    config.host.backends = backends.to_vec();
    config.timeouts.connect_secs = 2;
    config.timeouts.request_secs = 5;
    config
}

/// Test client: no system proxy, no redirects, bodies as they arrive on the wire.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .build()
        .unwrap()
}
