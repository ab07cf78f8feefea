use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportError;

/// Fetches one poll body. Timeouts and connection reuse belong here, not
/// in the executor.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Bytes, TransportError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.bytes().await.map_err(|source| TransportError::Request {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = sock.read(&mut buf).await;
            let resp = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = sock.write_all(resp.as_bytes()).await;
        });
        format!("http://{addr}/api/v1/progress")
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let url = serve_once("200 OK", r#"{"bitrate":1,"fps":2,"percentage":3}"#).await;
        let body = HttpTransport::new(Duration::from_secs(2)).fetch(&url).await.unwrap();
        assert_eq!(&body[..], br#"{"bitrate":1,"fps":2,"percentage":3}"#);
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let url = serve_once("503 Service Unavailable", "busy").await;
        let err = HttpTransport::new(Duration::from_secs(2)).fetch(&url).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = HttpTransport::new(Duration::from_secs(2))
            .fetch(&format!("http://{addr}/p"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
    }
}
