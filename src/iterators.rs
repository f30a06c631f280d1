//! Iterator utilities for working with probe results.

use core::fmt;
use core::time::Duration;

use crate::types::ProbeResult;

/// Extension trait for slices of `ProbeResult` to provide summary functionality
pub trait ProbeResultSliceExt {
    /// Get summary statistics
    fn summary(&self) -> ResultSummary;
    /// Get successful results
    fn successful_results(&self) -> impl Iterator<Item = &ProbeResult>;
    /// Get failed results
    fn failed_results(&self) -> impl Iterator<Item = &ProbeResult>;
}

impl ProbeResultSliceExt for [ProbeResult] {
    fn summary(&self) -> ResultSummary {
        let successful_count = self.successful_results().count();

        ResultSummary {
            total_targets: self.len(),
            successful_count,
            failed_count: self.len() - successful_count,
            total_elapsed: self.iter().map(|r| r.elapsed).sum(),
            slowest: self
                .iter()
                .max_by_key(|r| r.elapsed)
                .map(|r| (r.request.endpoint(), r.elapsed)),
        }
    }

    fn successful_results(&self) -> impl Iterator<Item = &ProbeResult> {
        self.iter().filter(|r| r.success)
    }

    fn failed_results(&self) -> impl Iterator<Item = &ProbeResult> {
        self.iter().filter(|r| !r.success)
    }
}

/// Summary statistics for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub total_targets: usize,
    pub successful_count: usize,
    pub failed_count: usize,
    /// Sum of every probe's elapsed time; probes run one after another
    pub total_elapsed: Duration,
    /// Endpoint and elapsed time of the slowest probe
    pub slowest: Option<(String, Duration)>,
}

impl ResultSummary {
    #[must_use]
    pub const fn all_successful(&self) -> bool {
        self.failed_count == 0
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Targets: {}/{} connected, {} failed, elapsed: {:?}",
            self.successful_count, self.total_targets, self.failed_count, self.total_elapsed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetSpec;

    fn result(port: u16, success: bool, elapsed_ms: u64) -> ProbeResult {
        let target = TargetSpec::new("n", "tcp", "localhost", port);
        let mut record = ProbeResult::new(&target, Duration::from_secs(10))
            .with_elapsed(Duration::from_millis(elapsed_ms));
        record.success = success;
        if !success {
            record.failure_message = "Test error".to_string();
        }
        record
    }

    #[test]
    fn successful_and_failed_results() {
        let results = vec![result(8080, true, 100), result(8081, false, 200), result(8082, true, 150)];

        let successful: Vec<_> = results.successful_results().collect();
        assert_eq!(successful.len(), 2);
        assert!(successful.iter().all(|r| r.success));

        let failed: Vec<_> = results.failed_results().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].request.port, 8081);
    }

    #[test]
    fn summary_counts_and_elapsed() {
        let results = vec![result(8080, true, 100), result(8081, false, 200), result(8082, true, 150)];

        let summary = results.summary();
        assert_eq!(summary.total_targets, 3);
        assert_eq!(summary.successful_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert!(!summary.all_successful());
        assert_eq!(summary.total_elapsed, Duration::from_millis(450));
        assert_eq!(
            summary.slowest,
            Some(("tcp://localhost:8081".to_string(), Duration::from_millis(200)))
        );
    }

    #[test]
    fn summary_empty() {
        let results: Vec<ProbeResult> = vec![];
        let summary = results.summary();

        assert_eq!(summary.total_targets, 0);
        assert_eq!(summary.failed_count, 0);
        assert!(summary.all_successful());
        assert_eq!(summary.total_elapsed, Duration::ZERO);
        assert_eq!(summary.slowest, None);
    }

    #[test]
    fn summary_display() {
        let results = vec![result(8080, true, 100)];
        let display = results.summary().to_string();
        assert!(display.contains("1/1 connected"));
        assert!(display.contains("0 failed"));
        assert!(display.contains("100ms"));
    }
}
