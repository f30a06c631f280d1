//! Plain-text report of a run.
//!
//! Each result is rendered through a `minijinja` template into a block of
//! `[TEST DETAILS]` and `[HTTP ONLY DETAILS]`, preceded by the test name.

use std::path::{Path, PathBuf};

use minijinja::{Environment, context};
use tracing::info;

use crate::config::TestConfig;
use crate::error::{Result, ResultExt};
use crate::types::ProbeResult;

/// File name of the report written into the output directory.
pub const REPORT_FILE_NAME: &str = "testresults.log";

const RESULT_TEMPLATE_NAME: &str = "result.txt";

const RESULT_TEMPLATE: &str = "
=========================================================================================
[TEST DETAILS]
\tNetwork tested         : {{ request.name }}
\tEndpoint requested     : {{ endpoint }}
\tConnected successfully : {{ success }}
\tTotal request time     : {{ time }}
\tFailure Message        : {{ failure_message }}

[HTTP ONLY DETAILS]
\tHTTP Status code       : {{ status_code }}
\tIP-DNS resolution      : {{ resolved_address }}
\tResponse body          : {{ body }}
{%- if body_error %}
\tBody capture error     : {{ body_error }}
{%- endif %}
";

fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template(RESULT_TEMPLATE_NAME, RESULT_TEMPLATE)?;
    Ok(env)
}

fn render_with(env: &Environment<'_>, result: &ProbeResult) -> Result<String> {
    let template = env.get_template(RESULT_TEMPLATE_NAME)?;
    let mut text = template.render(context! {
        request => &result.request,
        endpoint => result.request.endpoint(),
        success => result.success,
        time => result.elapsed_display(),
        failure_message => &result.failure_message,
        status_code => result.status_code,
        resolved_address => &result.resolved_address,
        body => &result.body,
        body_error => &result.body_error,
    })?;
    text.push('\n');
    Ok(text)
}

/// Render the block for a single result.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_result(result: &ProbeResult) -> Result<String> {
    render_with(&environment()?, result)
}

/// Render the whole report: the test name followed by one block per result,
/// in result order.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_report(config: &TestConfig, results: &[ProbeResult]) -> Result<String> {
    let env = environment()?;
    let mut report = format!("Test name: {name}\n", name = config.test_name);
    for result in results {
        report.push_str(&render_with(&env, result)?);
    }
    Ok(report)
}

/// Write `report` to [`REPORT_FILE_NAME`] inside `directory`, replacing any
/// previous report, and return the file path.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_report(directory: &Path, report: &str) -> Result<PathBuf> {
    let path = directory.join(REPORT_FILE_NAME);
    std::fs::write(&path, report)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(path)
}
