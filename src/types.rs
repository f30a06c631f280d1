//! Core data types: what to probe and what came back.

use core::fmt;
use core::time::Duration;
use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};

/// Informational text stored in [`ProbeResult::resolved_address`] when the
/// IPv4 lookup for an HTTP target fails.
pub const RESOLUTION_FAILED: &str = "Failed to resolve IP from DNS.";

/// One configured endpoint to probe.
///
/// Deserializes from the lower-case YAML keys used by existing nettest
/// configs (`networkname`, `proto`, `capturebody`) as well as the longer
/// field names. Missing fields take their zero value, so a malformed entry
/// surfaces as a failed probe rather than a load error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSpec {
    /// Human-readable label for the network being tested
    #[serde(rename(deserialize = "networkname"), alias = "name")]
    pub name: String,
    pub host: String,
    /// HTTP only; normalized to start with `/` when requested
    pub path: String,
    /// Kept as written; out-of-range values fail at connect time
    pub port: i64,
    /// Raw protocol string, compared case-insensitively
    #[serde(rename(deserialize = "proto"), alias = "protocol")]
    pub protocol: String,
    /// Per-target timeout in seconds; 0 means use the run-wide default
    pub timeout: u64,
    /// HTTP only; keep the response body in the result
    #[serde(rename(deserialize = "capturebody"), alias = "capture_body")]
    pub capture_body: bool,
}

impl TargetSpec {
    /// Create a target with no path, default timeout and no body capture.
    pub fn new(
        name: impl Into<String>,
        protocol: impl Into<String>,
        host: impl Into<String>,
        port: impl Into<i64>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: port.into(),
            protocol: protocol.into(),
            ..Self::default()
        }
    }

    /// Set the request path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set a per-target timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Enable or disable response body capture.
    #[must_use]
    pub fn with_capture_body(mut self, capture: bool) -> Self {
        self.capture_body = capture;
        self
    }

    /// Classify the protocol field.
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        Protocol::parse(&self.protocol)
    }

    /// The per-target timeout when set, otherwise `default`.
    #[must_use]
    pub const fn effective_timeout(&self, default: Duration) -> Duration {
        if self.timeout > 0 {
            Duration::from_secs(self.timeout)
        } else {
            default
        }
    }

    /// The port as a TCP port number, or `None` when it is out of range.
    #[must_use]
    pub fn port_number(&self) -> Option<u16> {
        u16::try_from(self.port).ok()
    }

    /// Path with a leading `/` added when non-empty and missing one.
    #[must_use]
    pub fn normalized_path(&self) -> String {
        if self.path.is_empty() || self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{path}", path = self.path)
        }
    }

    /// URL requested by the HTTP probe: `<scheme>://<host>:<port><path>`.
    ///
    /// An empty path yields the bare `host:port` with no trailing slash.
    /// IPv6 literals are bracketed.
    #[must_use]
    pub fn request_url(&self) -> String {
        let host = if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{host}]", host = self.host)
        } else {
            self.host.clone()
        };
        format!(
            "{scheme}://{host}:{port}{path}",
            scheme = self.protocol(),
            port = self.port,
            path = self.normalized_path()
        )
    }

    /// Endpoint exactly as configured, for reports.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{proto}://{host}:{port}{path}",
            proto = self.protocol,
            host = self.host,
            port = self.port,
            path = self.path
        )
    }
}

/// Protocol of a target, resolved once from its raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Http,
    Https,
    /// Anything else, holding the value as configured
    Unsupported(String),
}

impl Protocol {
    /// Case-insensitive classification. Never fails; unknown values become
    /// [`Protocol::Unsupported`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "tcp" => Self::Tcp,
            "http" => Self::Http,
            "https" => Self::Https,
            _ => Self::Unsupported(raw.to_string()),
        }
    }

    #[must_use]
    pub const fn is_http(&self) -> bool {
        matches!(self, Self::Http | Self::Https)
    }

    /// Upper-case label for progress lines, e.g. `TCP`.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string().to_ascii_uppercase()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Http => f.write_str("http"),
            Self::Https => f.write_str("https"),
            Self::Unsupported(raw) => f.write_str(raw),
        }
    }
}

/// Outcome of probing one target.
///
/// Holds its own copy of the originating [`TargetSpec`], so the record is
/// unaffected by anything done to the configuration afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub request: TargetSpec,
    /// Connection established (TCP) or HTTP round trip completed, whatever the status
    pub success: bool,
    /// HTTP status code; 0 for TCP and failed requests
    pub status_code: u16,
    /// Empty on success
    pub failure_message: String,
    /// Response body when captured
    pub body: String,
    pub elapsed: Duration,
    /// HTTP only: resolved IPv4 address or [`RESOLUTION_FAILED`]
    pub resolved_address: String,
    /// Effective timeout applied to the probe
    pub timeout: Duration,
    /// Set when body capture was requested but reading the body failed.
    /// Does not affect `success`.
    pub body_error: Option<String>,
}

impl ProbeResult {
    /// A not-yet-successful record for `request`.
    #[must_use]
    pub fn new(request: &TargetSpec, timeout: Duration) -> Self {
        Self {
            request: request.clone(),
            success: false,
            status_code: 0,
            failure_message: String::new(),
            body: String::new(),
            elapsed: Duration::ZERO,
            resolved_address: String::new(),
            timeout,
            body_error: None,
        }
    }

    /// Mark the record failed with `message`.
    #[must_use]
    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.success = false;
        self.failure_message = message.into();
        self
    }

    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Elapsed time as `88.212457ms` or `1.388307603s`.
    #[must_use]
    pub fn elapsed_display(&self) -> String {
        format!("{elapsed:?}", elapsed = self.elapsed)
    }
}
