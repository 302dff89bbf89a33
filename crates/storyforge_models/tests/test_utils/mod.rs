//! Test utilities for the Gemini client.
//!
//! [`CannedServer`] is a minimal HTTP/1.1 endpoint on localhost that replays
//! scripted replies and records every request it receives.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A request as seen by the server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Request path including query
    pub path: String,
    /// Headers with lowercased names
    pub headers: Vec<(String, String)>,
    /// Parsed JSON body
    pub body: serde_json::Value,
}

impl CapturedRequest {
    /// Value of the first header named `name` (lowercase).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Scripted HTTP endpoint.
pub struct CannedServer {
    /// Root URL to hand to the client
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: JoinHandle<()>,
}

impl CannedServer {
    /// Start serving `replies` in order; once exhausted, every request gets a 500.
    pub async fn start(replies: Vec<(u16, String)>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let replies = Arc::new(Mutex::new(VecDeque::from(replies)));

        let captured = requests.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let reply = replies
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or((500, "script exhausted".to_string()));
                if let Ok(request) = serve(stream, reply).await {
                    captured.lock().unwrap().push(request);
                }
            }
        });

        Ok(Self {
            base_url,
            requests,
            handle,
        })
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for CannedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    (status, reply_body): (u16, String),
) -> anyhow::Result<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        anyhow::ensure!(n > 0, "connection closed before headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        anyhow::ensure!(n > 0, "connection closed before body");
        buf.extend_from_slice(&chunk[..n]);
    }

    let raw_body = &buf[header_end..header_end + content_length];
    let body = if raw_body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(raw_body)?
    };

    let response = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reply_body.len(),
        reply_body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;

    Ok(CapturedRequest {
        path,
        headers,
        body,
    })
}

/// A successful reply carrying one text part.
pub fn text_reply(text: &str) -> (u16, String) {
    let body = serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    });
    (200, body.to_string())
}

/// A successful reply carrying one inline image.
pub fn image_reply(mime: &str, base64_data: &str) -> (u16, String) {
    let body = serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [
                {"text": "Here is your image."},
                {"inlineData": {"mimeType": mime, "data": base64_data}}
            ]},
            "finishReason": "STOP"
        }]
    });
    (200, body.to_string())
}

/// A quota-exceeded reply.
pub fn throttled_reply() -> (u16, String) {
    let body = serde_json::json!({
        "error": {
            "code": 429,
            "message": "Resource has been exhausted (e.g. check quota).",
            "status": "RESOURCE_EXHAUSTED"
        }
    });
    (429, body.to_string())
}
