//! Error types for the parts of a run that can abort it.
//!
//! Probes never produce these: a failed probe is recorded as data on its
//! [`ProbeResult`](crate::ProbeResult). The errors here cover the plumbing
//! around the probes, where giving up is the only sensible answer:
//!
//! - [`NettestError`] - loading the target list or writing the report
//! - [`ResultExt`] - extension trait for attaching a message to a lower-level error
//!
//! # Examples
//!
//! ```rust
//! use nettest::{NettestError, TestConfig};
//!
//! match TestConfig::from_yaml_str("testname: empty\nconfig: []\n") {
//!     Err(NettestError::EmptyConfig) => eprintln!("nothing to test"),
//!     Err(e) => eprintln!("config error: {e}"),
//!     Ok(config) => println!("{} targets", config.targets.len()),
//! }
//! ```

use std::borrow::Cow;
use thiserror::Error;

/// Lower-level failures that can be wrapped with a context message.
#[derive(Error, Debug)]
pub enum ErrorSource {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors that terminate a run.
#[derive(Error, Debug)]
pub enum NettestError {
    #[error("Nettest config was invalid or didn't contain any test cases")]
    EmptyConfig,
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] serde_yaml::Error),
    #[error("Report template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("{message}: {source}")]
    WithContext {
        message: Cow<'static, str>,
        #[source]
        source: ErrorSource,
    },
}

/// Result type alias for nettest operations.
pub type Result<T> = std::result::Result<T, NettestError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped in [`NettestError::WithContext`]
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped in [`NettestError::WithContext`]
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ErrorSource>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| NettestError::WithContext {
            message: Cow::Owned(f()),
            source: e.into(),
        })
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| NettestError::WithContext {
            message: Cow::Borrowed(msg),
            source: e.into(),
        })
    }
}
