//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// A mock upstream mirror serving a fixed path → (status, body) table.
pub struct MockMirror {
    pub addr: SocketAddr,
    hits: Arc<AtomicU32>,
}

impl MockMirror {
    /// Total number of requests the mirror has answered.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Host string for a MirrorConfig pointing at this mock.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }
}

/// Start a mock mirror. Unknown paths answer 404.
pub async fn start_mock_mirror(responses: HashMap<String, (u16, String)>) -> MockMirror {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let responses = Arc::new(responses);

    let hit_counter = hits.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let responses = responses.clone();
                    let hit_counter = hit_counter.clone();
                    tokio::spawn(async move {
                        let (read_half, write_half) = socket.split();
                        let mut reader = BufReader::new(read_half);

                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.is_err() {
                            return;
                        }
                        // Drain the header block before answering.
                        loop {
                            let mut line = String::new();
                            match reader.read_line(&mut line).await {
                                Ok(0) => break,
                                Ok(_) if line == "\r\n" || line == "\n" => break,
                                Ok(_) => {}
                                Err(_) => return,
                            }
                        }

                        let path = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();
                        hit_counter.fetch_add(1, Ordering::SeqCst);

                        let (status, body) = responses
                            .get(&path)
                            .cloned()
                            .unwrap_or((404, "not here".to_string()));
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let mut write_half = write_half;
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = write_half.write_all(response_str.as_bytes()).await;
                        let _ = write_half.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockMirror { addr, hits }
}

/// Send raw bytes to the proxy and read the whole response until close.
pub async fn send_raw(addr: SocketAddr, request: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}
