// ABOUTME: Fake upstream HTTP servers on ephemeral localhost ports
// ABOUTME: Lets HTTP clients run against real sockets with scripted responses

use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve `router` on 127.0.0.1 and return its base URL
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("upstream server");
    });
    format!("http://{addr}")
}

/// Request counter shared with handlers
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Base URL nothing listens on
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

/// Base URL of a server that promises a longer body than it sends
///
/// Each connection reads the full request, answers `200` with a
/// `Content-Length` past the bytes written, then hangs up.
pub async fn truncated_body() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut chunk = [0_u8; 4096];
            while !request_complete(&request) {
                if stream.readable().await.is_err() {
                    break;
                }
                match stream.try_read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                    Err(_) => break,
                }
            }
            let partial = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                           content-length: 512\r\n\r\n{\"access_token\":\"tru";
            if stream.writable().await.is_ok() {
                let _ = stream.try_write(partial.as_bytes());
            }
        }
    });
    format!("http://{addr}")
}

fn request_complete(request: &[u8]) -> bool {
    let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    request.len() >= end + 4 + length
}
