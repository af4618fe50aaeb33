//! Blocking HTTP helpers over a shared async client.
//!
//! Uses async reqwest internally but presents a sync interface; every
//! caller in this workspace is single-threaded and blocking by contract.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level failure with the HTTP status when one was received.
#[derive(Debug)]
pub struct HttpError {
    pub status: Option<u16>,
    message: String,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(s) => write!(f, "HTTP {s}: {}", self.message),
            None => write!(f, "HTTP error: {}", self.message),
        }
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(8)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime backing the sync facade.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HEAD a URL and report whether it resolves to status 200 exactly.
///
/// Redirects are followed; a chain ending anywhere other than 200 is `false`.
pub fn url_exists(url: &str) -> Result<bool, HttpError> {
    let status = SHARED_RUNTIME
        .handle()
        .block_on(async { http_client().head(url).send().await.map(|r| r.status()) })
        .map_err(|e| HttpError::from_reqwest(&e))?;
    Ok(status == reqwest::StatusCode::OK)
}

/// GET a URL and buffer the whole body. Non-success statuses are errors.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, HttpError> {
    let bytes = SHARED_RUNTIME
        .handle()
        .block_on(async {
            let resp = http_client().get(url).send().await?.error_for_status()?;
            resp.bytes().await
        })
        .map_err(|e| HttpError::from_reqwest(&e))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serve one canned HTTP response on a loopback port, then exit.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn url_exists_true_on_200() {
        let base = serve_once("HTTP/1.1 200 OK", "");
        assert!(url_exists(&base).unwrap());
    }

    #[test]
    fn url_exists_false_on_404() {
        let base = serve_once("HTTP/1.1 404 Not Found", "");
        assert!(!url_exists(&base).unwrap());
    }

    #[test]
    fn fetch_bytes_returns_body() {
        let base = serve_once("HTTP/1.1 200 OK", "payload");
        assert_eq!(fetch_bytes(&base).unwrap(), b"payload");
    }

    #[test]
    fn fetch_bytes_errors_on_500() {
        let base = serve_once("HTTP/1.1 500 Internal Server Error", "");
        let err = fetch_bytes(&base).unwrap_err();
        assert_eq!(err.status, Some(500));
    }

    #[test]
    fn http_error_display_includes_status() {
        let err = HttpError {
            status: Some(404),
            message: "not found".to_string(),
        };
        assert_eq!(format!("{err}"), "HTTP 404: not found");
    }
}
