//! Test configuration loading and run options.
//!
//! A [`TestConfig`] is the YAML document listing the targets to probe. It can
//! be read from a local file or fetched over HTTP(S):
//!
//! ```yaml
//! testname: Pre-event connectivity
//! email: ops@example.com
//! config:
//!   - networkname: vendor portal
//!     host: example.com
//!     port: 443
//!     proto: https
//!     path: /status
//!     timeout: 5
//!     capturebody: true
//!   - networkname: ssh bastion
//!     host: 10.0.0.5
//!     port: 22
//!     proto: tcp
//! ```
//!
//! [`RunOptions`] holds everything else a run needs and is built with
//! [`RunOptionsBuilder`]:
//!
//! ```rust
//! use nettest::RunOptions;
//! use std::time::Duration;
//!
//! let options = RunOptions::builder()
//!     .config_location("https://config.example.com/nettest.yaml")
//!     .output_directory("/tmp/reports")
//!     .default_timeout(Duration::from_secs(5))
//!     .echo_report(true)
//!     .build();
//! assert_eq!(options.default_timeout, Duration::from_secs(5));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{NettestError, Result, ResultExt};
use crate::types::TargetSpec;

/// Timeout for downloading a remote configuration file.
pub const CONFIG_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_LOCATION: &str = "resources/config.yaml";

/// Run-wide timeout for targets that do not set their own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A named list of targets to probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    #[serde(rename(deserialize = "testname"), alias = "test_name")]
    pub test_name: String,
    pub email: String,
    #[serde(rename(deserialize = "config"), alias = "targets")]
    pub targets: Vec<TargetSpec>,
}

impl TestConfig {
    /// Decode a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`NettestError::InvalidConfig`] for malformed YAML and
    /// [`NettestError::EmptyConfig`] when no targets are listed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        if config.targets.is_empty() {
            return Err(NettestError::EmptyConfig);
        }
        Ok(config)
    }

    /// Load a configuration from a file path or an `http(s)` URL.
    ///
    /// Any location starting with `http` (case-insensitive) is downloaded;
    /// everything else is treated as a path.
    ///
    /// # Errors
    ///
    /// Returns an error when the location cannot be read or fetched, or its
    /// content is not a usable configuration.
    pub async fn load(location: &str) -> Result<Self> {
        let content = if is_remote(location) {
            fetch(location).await?
        } else {
            debug!("Reading config from {location}");
            tokio::fs::read_to_string(location)
                .await
                .with_context(|| format!("Failed to read configuration file {location}"))?
        };

        let config = Self::from_yaml_str(&content)?;
        info!(
            "Loaded test '{name}' with {count} target(s) from {location}",
            name = config.test_name,
            count = config.targets.len()
        );
        Ok(config)
    }
}

fn is_remote(location: &str) -> bool {
    location.to_ascii_lowercase().starts_with("http")
}

async fn fetch(location: &str) -> Result<String> {
    debug!("Downloading config from {location}");
    let client = reqwest::Client::builder()
        .timeout(CONFIG_FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(location)
        .send()
        .await
        .with_context(|| format!("Request to retrieve nettest config file {location} failed"))?;

    response
        .text()
        .await
        .with_context(|| format!("Failed to read nettest config body from {location}"))
}

/// Options for one nettest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// File path or URL of the configuration
    pub config_location: String,
    /// Directory the report file is written to
    pub output_directory: PathBuf,
    /// Also print the report to stdout
    pub echo_report: bool,
    /// Timeout for targets without their own
    pub default_timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config_location: DEFAULT_CONFIG_LOCATION.to_string(),
            output_directory: PathBuf::from("."),
            echo_report: false,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RunOptions {
    /// Create a new builder for `RunOptions`.
    #[must_use]
    pub fn builder() -> RunOptionsBuilder {
        RunOptionsBuilder::default()
    }
}

/// Builder for `RunOptions`.
#[derive(Debug, Clone, Default)]
pub struct RunOptionsBuilder {
    options: RunOptions,
}

impl RunOptionsBuilder {
    /// Set where the configuration is loaded from.
    #[must_use]
    pub fn config_location(mut self, location: impl Into<String>) -> Self {
        self.options.config_location = location.into();
        self
    }

    /// Set the report directory.
    #[must_use]
    pub fn output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.options.output_directory = directory.into();
        self
    }

    /// Print the report to stdout as well as the file.
    #[must_use]
    pub fn echo_report(mut self, echo: bool) -> Self {
        self.options.echo_report = echo;
        self
    }

    /// Set the run-wide default timeout. Zero is ignored.
    #[must_use]
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.options.default_timeout = timeout;
        }
        self
    }

    /// Build the `RunOptions`.
    #[must_use]
    pub fn build(self) -> RunOptions {
        self.options
    }
}
