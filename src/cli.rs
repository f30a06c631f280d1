use clap::{CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use nettest::config::DEFAULT_CONFIG_LOCATION;
use nettest::{
    NettestError, ProbeResult, ProbeResultSliceExt, Progress, RunOptions, TargetSpec, TestConfig,
    render_report, run_tests_with_progress, write_report,
};
use std::path::PathBuf;
use std::time::Duration;

use crate::logging;

/// Extended error type for CLI-specific errors
#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Nettest(#[from] NettestError),
    #[error("Invalid timeout format '{0}': {1}")]
    InvalidTimeout(String, String),
    #[error("Invalid progress template: {0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),
}

type Result<T> = std::result::Result<T, CliError>;

#[derive(Parser)]
#[command(name = "nettest")]
#[command(about = "Network connectivity testing utility: probe TCP and HTTP(S) endpoints and write a report")]
#[command(version)]
struct Args {
    /// Location of the nettest config file: a local path or an http(s) URL
    #[arg(short, long, env = "NETTEST_CONFIG", default_value = DEFAULT_CONFIG_LOCATION)]
    config: String,

    /// Directory to save the nettest report
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    /// Also print the test report to standard out
    #[arg(long)]
    log: bool,

    /// Timeout for endpoints without their own (e.g. "10", "10s", "1m")
    #[arg(short, long, env = "NETTEST_TIMEOUT", default_value = "10")]
    timeout: String,

    /// Suppress banner and progress output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log probe details to stderr (-vv for debug output)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Generate shell completion script
    #[arg(long, value_enum)]
    generate_completion: Option<clap_complete::Shell>,
}

#[derive(Debug, Clone)]
struct CliConfig {
    options: RunOptions,
    quiet: bool,
}

impl CliConfig {
    fn from_args(args: Args) -> Result<Self> {
        let timeout = parse_timeout(&args.timeout)?;

        let options = RunOptions::builder()
            .config_location(args.config)
            .output_directory(args.directory)
            .echo_report(args.log)
            .default_timeout(timeout)
            .build();

        Ok(Self {
            options,
            quiet: args.quiet,
        })
    }
}

/// Accept whole seconds ("10") or a humantime duration ("10s", "1m 30s").
fn parse_timeout(raw: &str) -> Result<Duration> {
    let timeout = match raw.trim().parse::<u64>() {
        Ok(seconds) => Duration::from_secs(seconds),
        Err(_) => raw
            .parse::<humantime::Duration>()
            .map_err(|e| CliError::InvalidTimeout(raw.to_string(), e.to_string()))?
            .into(),
    };

    if timeout.is_zero() {
        return Err(CliError::InvalidTimeout(
            raw.to_string(),
            "timeout must be positive".to_string(),
        ));
    }
    Ok(timeout)
}

/// One spinner line per target while it is probed.
struct SpinnerProgress {
    style: ProgressStyle,
    current: Option<ProgressBar>,
    quiet: bool,
}

impl SpinnerProgress {
    fn new(quiet: bool) -> Result<Self> {
        Ok(Self {
            style: ProgressStyle::with_template("{spinner:.green} {msg}")?,
            current: None,
            quiet,
        })
    }

    fn line(target: &TargetSpec) -> String {
        format!(
            "> Host: {host} ({label})...",
            host = target.host,
            label = target.protocol().label()
        )
    }
}

impl Progress for SpinnerProgress {
    fn on_start(&mut self, _index: usize, target: &TargetSpec) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::new_spinner().with_style(self.style.clone());
        pb.set_message(Self::line(target));
        pb.enable_steady_tick(Duration::from_millis(100));
        self.current = Some(pb);
    }

    #[allow(clippy::print_stdout, reason = "progress falls back to stdout without a terminal")]
    fn on_finish(&mut self, _index: usize, result: &ProbeResult) {
        let Some(pb) = self.current.take() else {
            return;
        };
        let status = if result.success {
            format!("[{ok}]", ok = "OK".green())
        } else {
            format!(
                "[{failed}] {reason}",
                failed = "FAILED".red(),
                reason = result.failure_message
            )
        };
        let line = format!("{prefix} {status}", prefix = Self::line(&result.request));

        if pb.is_hidden() {
            println!("{line}");
        } else {
            pb.finish_with_message(line);
        }
    }
}

#[allow(clippy::print_stdout, reason = "CLI banner is written to stdout")]
fn intro() {
    println!("┌────────────────────────────────────────────────────────────────────────┐");
    println!(
        "│ {title}                                                          │",
        title = "N E T T E S T".red()
    );
    println!(
        "│ Network Connectivity Testing Utility v{version:<33}│",
        version = env!("CARGO_PKG_VERSION")
    );
    println!("└────────────────────────────────────────────────────────────────────────┘");
}

struct RunOutcome {
    path: PathBuf,
    report: String,
    summary: String,
}

async fn run_and_report(cli: &CliConfig, config: &TestConfig) -> Result<RunOutcome> {
    let mut progress = SpinnerProgress::new(cli.quiet)?;
    let results =
        run_tests_with_progress(&config.targets, cli.options.default_timeout, &mut progress).await;

    let report = render_report(config, &results)?;
    let path = write_report(&cli.options.output_directory, &report)?;
    Ok(RunOutcome {
        path,
        report,
        summary: results.summary().to_string(),
    })
}

/// Main CLI entry point
#[allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "CLI functions require stdout/stderr output"
)]
pub async fn run() -> i32 {
    let args = Args::parse();

    if let Some(shell) = args.generate_completion {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return 0;
    }

    if let Err(e) = logging::init(logging::level_from_flags(args.quiet, args.verbose)) {
        eprintln!("{e}");
    }

    let cli = match CliConfig::from_args(args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };

    if !cli.quiet {
        intro();
    }

    let config = match TestConfig::load(&cli.options.config_location).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Program exiting due to nettest config file error.");
            return 2;
        }
    };

    if !cli.quiet {
        println!("Running test '{name}'", name = config.test_name);
    }

    let outcome = match run_and_report(&cli, &config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    if cli.options.echo_report {
        print!("{report}", report = outcome.report);
    }

    if !cli.quiet {
        println!("\n{summary}", summary = outcome.summary);
        println!(
            "Network test(s) complete.\nPlease check file {path} for more details.\n",
            path = outcome.path.display()
        );
    }

    0
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "test code where panics are acceptable"
)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("10", 10_000; "bare seconds")]
    #[test_case(" 7 ", 7_000; "padded seconds")]
    #[test_case("10s", 10_000; "humantime seconds")]
    #[test_case("1m", 60_000; "humantime minutes")]
    #[test_case("1500ms", 1_500; "humantime millis")]
    fn parse_timeout_accepts(raw: &str, expected_ms: u64) {
        assert_eq!(parse_timeout(raw).unwrap(), Duration::from_millis(expected_ms));
    }

    #[test_case("0"; "zero")]
    #[test_case("0s"; "zero humantime")]
    #[test_case("soon"; "not a duration")]
    #[test_case("-5"; "negative")]
    fn parse_timeout_rejects(raw: &str) {
        match parse_timeout(raw) {
            Err(CliError::InvalidTimeout(value, _)) => assert_eq!(value, raw),
            other => panic!("expected InvalidTimeout, got {other:?}"),
        }
    }

    #[test]
    fn args_defaults() {
        let args = Args::try_parse_from(["nettest"]).unwrap();
        let cli = CliConfig::from_args(args).unwrap();

        assert_eq!(cli.options.config_location, DEFAULT_CONFIG_LOCATION);
        assert_eq!(cli.options.output_directory, PathBuf::from("."));
        assert_eq!(cli.options.default_timeout, Duration::from_secs(10));
        assert!(!cli.options.echo_report);
        assert!(!cli.quiet);
    }

    #[test]
    fn args_override() {
        let args = Args::try_parse_from([
            "nettest",
            "--config",
            "https://example.com/nettest.yaml",
            "--directory",
            "/tmp/reports",
            "--timeout",
            "3s",
            "--log",
            "--quiet",
        ])
        .unwrap();
        let cli = CliConfig::from_args(args).unwrap();

        assert_eq!(cli.options.config_location, "https://example.com/nettest.yaml");
        assert_eq!(cli.options.output_directory, PathBuf::from("/tmp/reports"));
        assert_eq!(cli.options.default_timeout, Duration::from_secs(3));
        assert!(cli.options.echo_report);
        assert!(cli.quiet);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["nettest", "-q", "-v"]).is_err());
    }

    #[test]
    fn quiet_progress_ignores_events() {
        let mut progress = SpinnerProgress::new(true).unwrap();
        let target = TargetSpec::new("n", "Tcp", "localhost", 1);
        progress.on_start(0, &target);
        assert!(progress.current.is_none());
        progress.on_finish(0, &ProbeResult::new(&target, Duration::from_secs(1)));
    }

    #[test]
    fn progress_line_uses_upper_case_label() {
        let target = TargetSpec::new("n", "https", "example.com", 443);
        assert_eq!(SpinnerProgress::line(&target), "> Host: example.com (HTTPS)...");
    }
}
