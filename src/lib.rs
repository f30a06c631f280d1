//! Network connectivity verification for a declared list of endpoints.
//!
//! Given an ordered list of targets (host, port, protocol, optional path),
//! nettest attempts a connection to each one, measures how long it took,
//! and records the outcome. It is meant for checking, ahead of time, that a
//! set of services is reachable from a particular network.
//!
//! # Features
//!
//! - **TCP probes**: timed connection establishment, nothing else sent
//! - **HTTP/HTTPS probes**: a GET request where any status code counts as
//!   reachable, with optional response body capture and an informational
//!   IPv4 lookup
//! - **Per-target timeouts** with a run-wide default
//! - **Never aborts mid-run**: every failure becomes data on the target's
//!   [`ProbeResult`]
//! - **Reports**: a plain-text report file in the historical nettest layout
//!
//! # Examples
//!
//! ## Probing a list of targets
//!
//! ```rust,no_run
//! use nettest::{TargetSpec, run_tests};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let targets = vec![
//!         TargetSpec::new("database", "tcp", "db.internal", 5432),
//!         TargetSpec::new("portal", "https", "portal.example.com", 443)
//!             .with_path("health")
//!             .with_timeout(5)
//!             .with_capture_body(true),
//!     ];
//!
//!     let results = run_tests(&targets, Duration::from_secs(10)).await;
//!     for result in &results {
//!         println!(
//!             "{} success={} status={} time={}",
//!             result.request.endpoint(),
//!             result.success,
//!             result.status_code,
//!             result.elapsed_display()
//!         );
//!     }
//! }
//! ```
//!
//! ## Loading a configuration and writing the report
//!
//! ```rust,no_run
//! use nettest::{ProbeResultSliceExt, RunOptions, TestConfig, render_report, run_tests, write_report};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), nettest::NettestError> {
//!     let options = RunOptions::builder()
//!         .config_location("resources/config.yaml")
//!         .build();
//!
//!     let config = TestConfig::load(&options.config_location).await?;
//!     let results = run_tests(&config.targets, options.default_timeout).await;
//!
//!     let report = render_report(&config, &results)?;
//!     let path = write_report(&options.output_directory, &report)?;
//!     println!("{} -> {}", results.summary(), path.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod iterators;
pub mod probe;
pub mod report;
pub mod types;

pub use config::{RunOptions, RunOptionsBuilder, TestConfig, DEFAULT_TIMEOUT};
pub use dispatch::{Progress, run_tests, run_tests_with_progress};
pub use error::{NettestError, Result, ResultExt};
pub use iterators::{ProbeResultSliceExt, ResultSummary};
pub use probe::{HttpProbe, Probe, TcpProbe, probe_for};
pub use report::{REPORT_FILE_NAME, render_report, render_result, write_report};
pub use types::{ProbeResult, Protocol, RESOLUTION_FAILED, TargetSpec};
