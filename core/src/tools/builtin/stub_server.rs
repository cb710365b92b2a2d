//! Loopback HTTP responder for adapter tests

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Canned response served for a path prefix
#[derive(Clone)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl StubResponse {
    pub fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: Some("text/html; charset=utf-8"),
            body: body.to_string(),
        }
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.to_string(),
        }
    }

    pub fn with_content_type(status: u16, content_type: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type: Some(content_type),
            body: body.to_string(),
        }
    }
}

pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Serve `routes` until the test ends. Routes match on path prefix,
    /// first match wins; anything else is a 404.
    pub async fn start(routes: Vec<(&'static str, StubResponse)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };

                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&head).to_string();
                let path = head
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                seen.lock().unwrap().push(head);

                let response = routes
                    .iter()
                    .find(|(prefix, _)| path.starts_with(prefix))
                    .map(|(_, response)| response.clone())
                    .unwrap_or(StubResponse {
                        status: 404,
                        content_type: Some("text/plain"),
                        body: "not found".to_string(),
                    });

                let mut raw = format!("HTTP/1.1 {} Stub\r\nConnection: close\r\n", response.status);
                if let Some(content_type) = response.content_type {
                    raw.push_str(&format!("Content-Type: {}\r\n", content_type));
                }
                raw.push_str(&format!(
                    "Content-Length: {}\r\n\r\n{}",
                    response.body.len(),
                    response.body
                ));
                stream.write_all(raw.as_bytes()).await.ok();
                stream.shutdown().await.ok();
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Raw request heads received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// HTTP client that ignores proxy environment variables
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
