//! Probe strategies: one network reachability attempt against one target.
//!
//! [`TcpProbe`] and [`HttpProbe`] share the [`Probe`] trait so the dispatcher
//! can pick one per target without caring how it works. A probe always
//! returns a [`ProbeResult`]; failures are recorded on it, never raised.

use async_trait::async_trait;
use core::time::Duration;
use std::time::Instant;

use tracing::{debug, info, warn};
use url::Url;

use crate::connection::{http_get, resolve_ipv4, tcp_connect};
use crate::types::{ProbeResult, Protocol, RESOLUTION_FAILED, TargetSpec};

/// Attempt a connection to a target and report the outcome.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Probe `target`, using `default_timeout` unless the target sets its own.
    async fn probe(&self, target: &TargetSpec, default_timeout: Duration) -> ProbeResult;

    /// Get a human-readable name for this probe
    fn name(&self) -> &'static str;
}

/// Connection-establishment check. No data is exchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self, target: &TargetSpec, default_timeout: Duration) -> ProbeResult {
        let conn_timeout = target.effective_timeout(default_timeout);
        let record = ProbeResult::new(target, conn_timeout);

        let start = Instant::now();
        let Some(port) = target.port_number() else {
            let message = format!("dial tcp {}:{}: invalid port", target.host, target.port);
            info!("Failed to access host via TCP: {message}");
            return record.failed(message).with_elapsed(start.elapsed());
        };
        let outcome = tcp_connect(&target.host, port, conn_timeout).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(()) => {
                debug!("TCP probe to {}:{} succeeded in {elapsed:?}", target.host, target.port);
                ProbeResult {
                    success: true,
                    ..record
                }
                .with_elapsed(elapsed)
            }
            Err(message) => {
                info!("Failed to access host via TCP: {message}");
                record.failed(message).with_elapsed(elapsed)
            }
        }
    }

    fn name(&self) -> &'static str {
        "tcp"
    }
}

/// HTTP(S) GET check. Any response status counts as reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpProbe;

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, target: &TargetSpec, default_timeout: Duration) -> ProbeResult {
        let request_timeout = target.effective_timeout(default_timeout);
        let mut record = ProbeResult::new(target, request_timeout);
        let start = Instant::now();

        let raw_url = target.request_url();
        let url = match Url::parse(&raw_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Unable to generate HTTP request for test {}: {e}", target.name);
                return record
                    .failed(format!("invalid request URL \"{raw_url}\": {e}"))
                    .with_elapsed(start.elapsed());
            }
        };

        // Informational only; the client does its own resolution.
        record.resolved_address = match resolve_ipv4(&target.host, request_timeout).await {
            Some(addr) => addr.to_string(),
            None => RESOLUTION_FAILED.to_string(),
        };

        match http_get(url, request_timeout, target.capture_body).await {
            Ok(outcome) => {
                record.success = true;
                record.status_code = outcome.status;
                if let Some(body) = outcome.body {
                    record.body = body;
                }
                if let Some(body_error) = outcome.body_error {
                    warn!("Unable to capture response body from {raw_url}: {body_error}");
                    record.body_error = Some(body_error);
                }
                debug!("HTTP probe to {raw_url} returned {}", record.status_code);
            }
            Err(message) => {
                info!("Unable to access host {}: {message}", target.host);
                record.failure_message = message;
            }
        }

        record.with_elapsed(start.elapsed())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

static TCP_PROBE: TcpProbe = TcpProbe;
static HTTP_PROBE: HttpProbe = HttpProbe;

/// Strategy for `protocol`, or `None` when it is unsupported.
#[must_use]
pub fn probe_for(protocol: &Protocol) -> Option<&'static dyn Probe> {
    match protocol {
        Protocol::Tcp => Some(&TCP_PROBE),
        Protocol::Http | Protocol::Https => Some(&HTTP_PROBE),
        Protocol::Unsupported(_) => None,
    }
}
