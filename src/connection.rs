//! Low-level network operations used by the probes.
//!
//! Every function here reports failure as plain error text. The probes turn
//! that text into result data; nothing in this module aborts a run.

use std::error::Error as StdError;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// Response details from a completed HTTP round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOutcome {
    pub status: u16,
    /// Present only when the body was requested and read in full
    pub body: Option<String>,
    /// Present when the body was requested but could not be read
    pub body_error: Option<String>,
}

/// Render an error followed by its source chain, joined with `": "`.
///
/// `reqwest` keeps the useful part of a failure (refused, timed out, bad
/// certificate) in the sources rather than the top-level message.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.ends_with(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Open a TCP connection to `host:port` and drop it straight away.
///
/// # Errors
///
/// Returns the connect error text, or a timeout message when `conn_timeout`
/// elapses first.
pub async fn tcp_connect(host: &str, port: u16, conn_timeout: Duration) -> Result<(), String> {
    debug!("TCP connect to {host}:{port} (timeout {conn_timeout:?})");
    match timeout(conn_timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(format!("dial tcp {host}:{port}: {e}")),
        Err(_) => Err(format!(
            "dial tcp {host}:{port}: connection timed out after {conn_timeout:?}"
        )),
    }
}

/// Resolve `host` to its first IPv4 address.
///
/// IP literals resolve to themselves. Returns `None` when the lookup fails,
/// yields only IPv6 addresses, or takes longer than `lookup_timeout`.
pub async fn resolve_ipv4(host: &str, lookup_timeout: Duration) -> Option<Ipv4Addr> {
    if let Ok(IpAddr::V4(addr)) = host.parse::<IpAddr>() {
        return Some(addr);
    }

    match timeout(lookup_timeout, lookup_host((host, 0))).await {
        Ok(Ok(mut addrs)) => addrs.find_map(|addr| match addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        }),
        Ok(Err(e)) => {
            debug!("DNS lookup for {host} failed: {e}");
            None
        }
        Err(_) => {
            debug!("DNS lookup for {host} timed out after {lookup_timeout:?}");
            None
        }
    }
}

/// Issue a GET for `url` with a client that gives up after `request_timeout`.
///
/// Any status code counts as a completed round trip. When `capture_body` is
/// set the full body is read; a read failure is reported in
/// [`HttpOutcome::body_error`] instead of failing the request.
///
/// # Errors
///
/// Returns the error chain text when the client cannot be built or the
/// request does not complete.
pub async fn http_get(
    url: Url,
    request_timeout: Duration,
    capture_body: bool,
) -> Result<HttpOutcome, String> {
    let client = reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .map_err(|e| format!("HTTP client error for {url}: {chain}", chain = error_chain(&e)))?;

    debug!("HTTP GET {url} (timeout {request_timeout:?})");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| error_chain(&e))?;

    let status = response.status().as_u16();
    if !capture_body {
        return Ok(HttpOutcome {
            status,
            body: None,
            body_error: None,
        });
    }

    // The response (and its connection) is consumed here on both arms.
    match response.text().await {
        Ok(body) => Ok(HttpOutcome {
            status,
            body: Some(body),
            body_error: None,
        }),
        Err(e) => Ok(HttpOutcome {
            status,
            body: None,
            body_error: Some(error_chain(&e)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn error_chain_joins_sources() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer("connection refused", None))),
        );
        assert_eq!(error_chain(&err), "error sending request: connection refused");
    }

    #[test]
    fn error_chain_skips_repeated_cause() {
        let err = Layer("timed out: deadline", Some(Box::new(Layer("deadline", None))));
        assert_eq!(error_chain(&err), "timed out: deadline");
    }

    #[tokio::test]
    async fn tcp_connect_success() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let result = tcp_connect("127.0.0.1", addr.port(), Duration::from_secs(1)).await;
        assert!(result.is_ok(), "expected success: {result:?}");
    }

    #[tokio::test]
    async fn tcp_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = tcp_connect("127.0.0.1", port, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.starts_with(&format!("dial tcp 127.0.0.1:{port}: ")), "{err}");
    }

    #[tokio::test]
    async fn resolve_ipv4_literal_and_localhost() {
        assert_eq!(
            resolve_ipv4("10.1.2.3", Duration::from_secs(1)).await,
            Some(Ipv4Addr::new(10, 1, 2, 3))
        );
        assert!(resolve_ipv4("::1", Duration::from_secs(1)).await.is_none());
    }

    #[tokio::test]
    async fn resolve_ipv4_unknown_host() {
        let addr = resolve_ipv4("nettest-no-such-host.invalid", Duration::from_secs(5)).await;
        assert!(addr.is_none());
    }

    #[tokio::test]
    async fn http_get_reads_status_and_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\nConnection: close\r\n\r\ndown")
                .await;
        });

        let url = Url::parse(&format!("http://127.0.0.1:{}/", addr.port())).unwrap();
        let outcome = http_get(url, Duration::from_secs(2), true).await.unwrap();
        assert_eq!(outcome.status, 503);
        assert_eq!(outcome.body.as_deref(), Some("down"));
        assert!(outcome.body_error.is_none());
    }
}
