//! Minimal JSON-RPC over HTTP/1.1 server for integration tests.
//!
//! Answers `eth_call` by matching the calldata against registered hex
//! prefixes; unmatched calls get a JSON-RPC "execution reverted" error.

use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A running server; `url` is its endpoint.
pub struct RpcServer {
    pub url: String,
    requests: Arc<AtomicUsize>,
}

impl RpcServer {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. `replies` maps calldata prefixes
/// (hex, no `0x`) to return data (hex, no `0x`); first match wins.
/// The server runs until the process exits.
pub fn start(replies: Vec<(String, String)>) -> RpcServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let replies = Arc::new(replies);
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let replies = Arc::clone(&replies);
            counter.fetch_add(1, Ordering::SeqCst);
            thread::spawn(move || handle(stream, &replies));
        }
    });
    RpcServer {
        url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&data[..header_end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < header_end + length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    Some(data[header_end..].to_vec())
}

fn handle(mut stream: TcpStream, replies: &[(String, String)]) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(body) = read_request(&mut stream) else {
        return;
    };
    let Ok(request) = serde_json::from_slice::<Value>(&body) else {
        let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
        return;
    };
    let id = request["id"].clone();
    let calldata = request["params"][0]["data"]
        .as_str()
        .unwrap_or("0x")
        .trim_start_matches("0x")
        .to_ascii_lowercase();
    let reply = match replies.iter().find(|(prefix, _)| calldata.starts_with(prefix.as_str())) {
        Some((_, result)) => json!({"jsonrpc": "2.0", "id": id, "result": format!("0x{}", result)}),
        None => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": 3, "message": "execution reverted"}
        }),
    };
    let payload = reply.to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    let _ = stream.write_all(response.as_bytes());
}
