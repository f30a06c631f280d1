#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test code where panics are acceptable"
)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::thread;

const NETTEST: &str = env!("CARGO_BIN_EXE_nettest");

/// Serve a fixed HTTP response to every connection from a background thread.
fn spawn_http_server(status_line: &'static str, body: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n{body}",
                len = body.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    port
}

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn write_config(dir: &Path, yaml: &str) -> String {
    let path = dir.join("config.yaml");
    std::fs::write(&path, yaml).unwrap();
    path.to_str().unwrap().to_string()
}

fn nettest(args: &[&str]) -> Output {
    Command::new(NETTEST)
        .args(args)
        .env_remove("NETTEST_CONFIG")
        .env_remove("NETTEST_TIMEOUT")
        .output()
        .expect("Failed to execute nettest")
}

#[test]
fn full_run_writes_report_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let http_port = spawn_http_server("404 Not Found", "fixed body");
    let tcp_port = spawn_http_server("200 OK", "");
    let dead_port = closed_port();

    let config = write_config(
        dir.path(),
        &format!(
            "testname: integration
config:
  - networkname: web
    host: 127.0.0.1
    port: {http_port}
    proto: HTTP
    path: status
    capturebody: true
  - networkname: raw tcp
    host: 127.0.0.1
    port: {tcp_port}
    proto: tcp
  - networkname: closed
    host: 127.0.0.1
    port: {dead_port}
    proto: Tcp
    timeout: 2
  - networkname: legacy
    host: files.example.com
    port: 21
    proto: ftp
"
        ),
    );
    let out_dir = dir.path().to_str().unwrap();

    let output = nettest(&["--config", &config, "--directory", out_dir, "--timeout", "5", "--quiet"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report = std::fs::read_to_string(dir.path().join("testresults.log")).unwrap();

    assert!(report.starts_with("Test name: integration\n"));
    assert_eq!(report.matches("[TEST DETAILS]").count(), 4);

    let web = report.find("Network tested         : web").unwrap();
    let raw = report.find("Network tested         : raw tcp").unwrap();
    let closed = report.find("Network tested         : closed").unwrap();
    let legacy = report.find("Network tested         : legacy").unwrap();
    assert!(web < raw && raw < closed && closed < legacy);

    let web_block = &report[web..raw];
    assert!(web_block.contains("Connected successfully : true"));
    assert!(web_block.contains("HTTP Status code       : 404"));
    assert!(web_block.contains("IP-DNS resolution      : 127.0.0.1"));
    assert!(web_block.contains("Response body          : fixed body"));

    let raw_block = &report[raw..closed];
    assert!(raw_block.contains("Connected successfully : true"));
    assert!(raw_block.contains("HTTP Status code       : 0"));

    let closed_block = &report[closed..legacy];
    assert!(closed_block.contains("Connected successfully : false"));
    assert!(!closed_block.contains("Failure Message        : \n"));

    let legacy_block = &report[legacy..];
    assert!(legacy_block.contains(
        "protocol \"ftp\" for host \"files.example.com\" is invalid; must be tcp, http, or https"
    ));
}

#[test]
fn log_flag_echoes_report() {
    let dir = tempfile::tempdir().unwrap();
    let port = spawn_http_server("200 OK", "hello");
    let config = write_config(
        dir.path(),
        &format!(
            "testname: echo\nconfig:\n  - networkname: local\n    host: 127.0.0.1\n    port: {port}\n    proto: http\n"
        ),
    );

    let output = nettest(&[
        "--config",
        &config,
        "--directory",
        dir.path().to_str().unwrap(),
        "--log",
        "--quiet",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Test name: echo"), "{stdout}");
    assert!(stdout.contains("Network tested         : local"), "{stdout}");
    assert!(stdout.contains("Response body          : \n"), "{stdout}");
}

#[test]
fn progress_lines_without_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "testname: progress\nconfig:\n  - networkname: legacy\n    host: files.example.com\n    port: 21\n    proto: ftp\n",
    );

    let output = nettest(&["--config", &config, "--directory", dir.path().to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Running test 'progress'"), "{stdout}");
    assert!(stdout.contains("> Host: files.example.com (FTP)..."), "{stdout}");
    assert!(stdout.contains("Network test(s) complete."), "{stdout}");
}

#[test]
fn missing_config_exits_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");

    let output = nettest(&["--config", missing.to_str().unwrap(), "--quiet"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Program exiting due to nettest config file error."), "{stderr}");
}

#[test]
fn empty_config_exits_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "testname: nothing\nconfig: []\n");

    let output = nettest(&["--config", &config, "--quiet"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("didn't contain any test cases"), "{stderr}");
}

#[test]
fn invalid_timeout_format() {
    let output = nettest(&["--timeout", "invalid", "--quiet"]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unwritable_report_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "testname: x\nconfig:\n  - networkname: legacy\n    host: h\n    port: 1\n    proto: ftp\n",
    );
    let missing_dir = dir.path().join("no-such-dir");

    let output = nettest(&["--config", &config, "--directory", missing_dir.to_str().unwrap(), "--quiet"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to create report file"), "{stderr}");
}
