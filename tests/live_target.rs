//! End-to-end tests against a live SSH target.
//!
//! These tests need a reachable target and are ignored by default. Point
//! them at one (e.g. a `linuxserver/openssh-server` container) via:
//!
//! ```sh
//! export TARGET_TUNNEL_TEST_HOST=172.17.0.2
//! export TARGET_TUNNEL_TEST_PORT=2222
//! export TARGET_TUNNEL_TEST_USER=tester
//! export TARGET_TUNNEL_TEST_PASSWORD=tester
//! cargo test --test live_target -- --ignored
//! ```

use std::time::Duration;

use target_tunnel::{Command, Session, SessionConfig, TIMEOUT_EXIT_STATUS};

fn test_config() -> SessionConfig {
    let host = std::env::var("TARGET_TUNNEL_TEST_HOST")
        .expect("TARGET_TUNNEL_TEST_HOST must point at a test target");
    let port = std::env::var("TARGET_TUNNEL_TEST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(22);
    let user = std::env::var("TARGET_TUNNEL_TEST_USER").unwrap_or_else(|_| "root".to_string());
    let password = std::env::var("TARGET_TUNNEL_TEST_PASSWORD").unwrap_or_default();

    SessionConfig::new(host)
        .port(port)
        .username(user)
        .auth(target_tunnel::AuthMethod::password(password))
}

fn command(line: &str) -> Command {
    Command::new(line)
        .start_timeout(Duration::from_secs(10))
        .max_exec_time(Duration::from_secs(30))
        .log_output(false)
}

#[test]
#[ignore] // requires a live SSH target
fn test_login_environment_is_sourced() {
    let mut session = Session::connect(test_config()).unwrap();

    let result = session
        .execute_output(&command("/bin/sh -c \"echo 'Username:' $USER && uname -a\""))
        .unwrap();

    assert_eq!(result.exit_status, 0);
    assert!(result.stdout_text().contains("Username:"));
}

#[test]
#[ignore] // requires a live SSH target
fn test_separate_stderr_capture() {
    let mut session = Session::connect(test_config()).unwrap();

    let result = session
        .execute_output(&command("echo out; echo err 1>&2; exit 7"))
        .unwrap();

    assert_eq!(result.exit_status, 7);
    assert!(result.stdout_text().contains("out"));
    assert!(result.stderr_text().contains("err"));
}

#[test]
#[ignore] // requires a live SSH target
fn test_merged_stderr_capture() {
    let mut session = Session::connect(test_config()).unwrap();

    let result = session
        .execute_output(&command("echo out; echo err 1>&2; exit 7").separate_stderr(false))
        .unwrap();

    assert_eq!(result.exit_status, 7);
    assert!(result.stderr.is_empty());
    let joined = result.stdout_text();
    assert!(joined.contains("out"));
    assert!(joined.contains("err"));
}

#[test]
#[ignore] // requires a live SSH target
fn test_line_splitting_fidelity() {
    let mut session = Session::connect(test_config()).unwrap();

    let result = session
        .execute_output(&command("printf 'a\\nb\\n'"))
        .unwrap();

    assert_eq!(result.exit_status, 0);
    assert!(result.stderr.is_empty());
    assert_eq!(result.stdout, vec!["a\n", "b\n"]);
}

#[test]
#[ignore] // requires a live SSH target
fn test_timeout_returns_sentinel_status() {
    let mut session = Session::connect(test_config()).unwrap();

    let result = session
        .execute_output(&command("sleep 2; echo done").max_exec_time(Duration::from_secs(1)))
        .unwrap();

    assert_eq!(result.exit_status, TIMEOUT_EXIT_STATUS);
    assert!(result.timed_out());

    // The session survives a timed-out command.
    let exit = session.execute("true").unwrap();
    assert_eq!(exit, 0);
}

#[test]
#[ignore] // requires a live SSH target
fn test_large_stdout_is_not_truncated() {
    let mut session = Session::connect(test_config()).unwrap();

    // Roughly 65 bytes per iteration => ~325KB, busybox-sh compatible.
    let line = "printf '0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef\\n'";
    let loop_cmd = format!("i=0; while [ $i -lt 5000 ]; do {}; i=$((i+1)); done", line);

    let result = session.execute_output(&command(&loop_cmd)).unwrap();

    assert_eq!(result.exit_status, 0);
    assert!(result.stderr.is_empty());
    assert!(result.stdout_text().len() > 300_000);
}

#[test]
#[ignore] // requires a live SSH target
fn test_session_close_is_idempotent() {
    let mut session = Session::connect(test_config()).unwrap();
    session.close();
    session.close();
    // Post-close use is rejected rather than hanging.
    assert!(session.execute("true").is_err());
}

#[test]
#[ignore] // requires a live SSH target
fn test_execute_once_async_wrapper() {
    let result = tokio_test::block_on(target_tunnel::execute_once(
        test_config(),
        command("echo -n async"),
    ))
    .unwrap();

    assert_eq!(result.exit_status, 0);
    assert_eq!(result.stdout_text(), "async");
}
