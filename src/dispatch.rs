//! Sequential dispatcher: probe every target in order and collect one
//! result per target.

use core::time::Duration;
use std::time::Instant;

use tracing::{debug, warn};

use crate::probe::probe_for;
use crate::types::{ProbeResult, Protocol, TargetSpec};

/// Observer notified around each probe, e.g. to drive a progress display.
pub trait Progress {
    /// Called before target `index` is probed.
    fn on_start(&mut self, index: usize, target: &TargetSpec);

    /// Called once the result for target `index` is recorded.
    fn on_finish(&mut self, index: usize, result: &ProbeResult);
}

/// Silent observer.
impl Progress for () {
    fn on_start(&mut self, _index: usize, _target: &TargetSpec) {}

    fn on_finish(&mut self, _index: usize, _result: &ProbeResult) {}
}

/// Probe every target in input order and return their results in the same
/// order.
///
/// Targets with a non-positive timeout use `default_timeout`. A failing
/// target never stops the run; the output always has one entry per input.
///
/// # Examples
///
/// ```rust,no_run
/// use nettest::{TargetSpec, run_tests};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let targets = vec![
///         TargetSpec::new("local ssh", "tcp", "127.0.0.1", 22),
///         TargetSpec::new("vendor site", "https", "example.com", 443).with_path("/"),
///     ];
///     for result in run_tests(&targets, Duration::from_secs(10)).await {
///         println!("{} -> {}", result.request.endpoint(), result.success);
///     }
/// }
/// ```
pub async fn run_tests(targets: &[TargetSpec], default_timeout: Duration) -> Vec<ProbeResult> {
    run_tests_with_progress(targets, default_timeout, &mut ()).await
}

/// Like [`run_tests`], reporting progress to `progress` as each target
/// starts and finishes.
pub async fn run_tests_with_progress<P>(
    targets: &[TargetSpec],
    default_timeout: Duration,
    progress: &mut P,
) -> Vec<ProbeResult>
where
    P: Progress + ?Sized,
{
    let mut results = Vec::with_capacity(targets.len());

    for (index, target) in targets.iter().enumerate() {
        progress.on_start(index, target);
        let result = dispatch_one(target, default_timeout).await;
        progress.on_finish(index, &result);
        results.push(result);
    }

    results
}

async fn dispatch_one(target: &TargetSpec, default_timeout: Duration) -> ProbeResult {
    let protocol = target.protocol();
    match probe_for(&protocol) {
        Some(probe) => {
            debug!("Probing {} with {} probe", target.endpoint(), probe.name());
            probe.probe(target, default_timeout).await
        }
        None => unsupported(target, &protocol, default_timeout),
    }
}

fn unsupported(target: &TargetSpec, protocol: &Protocol, default_timeout: Duration) -> ProbeResult {
    let start = Instant::now();
    let message = format!(
        "protocol \"{protocol}\" for host \"{host}\" is invalid; must be tcp, http, or https",
        host = target.host
    );
    warn!("{message}");
    ProbeResult::new(target, target.effective_timeout(default_timeout))
        .failed(message)
        .with_elapsed(start.elapsed())
}
