#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use scrapewatch::config::Config;

/// 一条预设响应
pub struct Reply {
    pub status: &'static str,
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Self { status: "200 OK", content_type: "application/json", headers: vec![], body: body.to_string() }
    }

    pub fn html(body: &str) -> Self {
        Self { status: "200 OK", content_type: "text/html; charset=utf-8", headers: vec![], body: body.to_string() }
    }

    pub fn status(status: &'static str, body: &str) -> Self {
        Self { status, content_type: "application/json", headers: vec![], body: body.to_string() }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: "302 FOUND",
            content_type: "text/html; charset=utf-8",
            headers: vec![("Location", location.to_string())],
            body: String::new(),
        }
    }
}

/// 收到的请求：请求行和正文
#[derive(Debug, Clone)]
pub struct Seen {
    pub request_line: String,
    pub body: String,
}

/// 按顺序回放响应的本地 HTTP 服务，每个连接只处理一个请求
pub struct StubServer {
    pub url: String,
    pub seen: Arc<Mutex<Vec<Seen>>>,
}

impl StubServer {
    pub async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            for reply in replies {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let request = read_request(&mut socket).await;
                log.lock().unwrap().push(request);

                let mut response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                    reply.status,
                    reply.content_type,
                    reply.body.len()
                );
                for (name, value) in &reply.headers {
                    response.push_str(&format!("{}: {}\r\n", name, value));
                }
                response.push_str("\r\n");
                response.push_str(&reply.body);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { url: format!("http://{}", addr), seen }
    }

    pub fn config(&self) -> Config {
        Config { server_url: self.url.clone(), ..Config::default() }
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|s| s.request_line.clone()).collect()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Seen {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end.min(buf.len())]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = (header_end + content_length).min(buf.len());
    Seen {
        request_line: head.lines().next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[header_end.min(buf.len())..body_end]).to_string(),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
