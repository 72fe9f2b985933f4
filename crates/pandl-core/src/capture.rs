//! Passive credential capture: watch drive traffic for the auth parameter.
//!
//! Spawns tcpdump scoped to one port/interface and scans its line stream for
//! `pan_auth=<token>`. Reads are bounded by a short poll so the caller never
//! blocks longer than the poll granularity, while the whole attempt respects
//! the wall-clock timeout. Single-instance enforcement lives in
//! [`crate::credential::CredentialStore::begin_capture`].

use std::process::Stdio;
use std::time::{Duration, Instant};

use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::error::{PandlError, Result};

const TOKEN_PATTERN: &str = r"pan_auth=([a-zA-Z0-9\-\._]+)";
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const KILL_GRACE: Duration = Duration::from_secs(2);

/// Capture the session token from live traffic, or fail with
/// `CaptureTimeout` / `CaptureError`.
pub async fn capture_token(timeout_secs: u64, port: u16, interface: &str) -> Result<String> {
    tracing::info!(
        "starting capture: port {port}, interface {interface}, timeout {timeout_secs}s"
    );
    // -A ascii payloads, -s 0 no snap length, -l line buffered, -n no DNS.
    let mut cmd = Command::new("tcpdump");
    cmd.args(["-i", interface, "-A", "-s", "0", "-l", "-n"])
        .arg(format!("port {port}"));
    scan_subprocess(cmd, timeout_secs).await
}

/// Run a line-producing subprocess and return the first token match from its
/// stdout. Kept separate from the tcpdump invocation so the read loop can be
/// exercised against any command.
pub(crate) async fn scan_subprocess(mut cmd: Command, timeout_secs: u64) -> Result<String> {
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    let mut child = cmd
        .spawn()
        .map_err(|err| PandlError::CaptureError(format!("spawn: {err}")))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| PandlError::CaptureError("subprocess stdout unavailable".to_string()))?;
    let mut lines = BufReader::new(stdout).lines();
    let pattern = Regex::new(TOKEN_PATTERN).expect("token pattern compiles");
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);

    let outcome = loop {
        if Instant::now() >= deadline {
            break Err(PandlError::CaptureTimeout(timeout_secs));
        }
        match tokio::time::timeout(POLL_INTERVAL, lines.next_line()).await {
            // No data this poll; notice an early subprocess death.
            Err(_elapsed) => {
                if matches!(child.try_wait(), Ok(Some(_))) {
                    break Err(PandlError::CaptureError(
                        "capture subprocess exited before a match".to_string(),
                    ));
                }
            }
            Ok(Ok(Some(line))) => {
                if let Some(caps) = pattern.captures(&line) {
                    let token = caps[1].to_string();
                    tracing::info!("captured token ({} chars)", token.len());
                    break Ok(token);
                }
            }
            Ok(Ok(None)) => {
                break Err(PandlError::CaptureError(
                    "capture stdout closed before a match".to_string(),
                ));
            }
            Ok(Err(err)) => {
                break Err(PandlError::CaptureError(format!("read: {err}")));
            }
        }
    };

    shutdown(&mut child).await;
    outcome
}

/// Graceful terminate, then forced kill after a short grace period.
async fn shutdown(child: &mut Child) {
    #[cfg(unix)]
    if let (Ok(None), Some(pid)) = (child.try_wait(), child.id()) {
        unsafe {
            libc::kill(pid as i32, libc::SIGTERM);
        }
        if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_ok() {
            return;
        }
    }
    let _ = child.kill().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[tokio::test]
    async fn first_matching_line_wins() {
        let cmd = sh(
            "echo 'GET /drive/v1/files?limit=1 HTTP/1.1'; \
             echo 'POST /drive/v1/task?pan_auth=abc-123._x HTTP/1.1'; \
             sleep 30",
        );
        let token = scan_subprocess(cmd, 10).await.unwrap();
        assert_eq!(token, "abc-123._x");
    }

    #[tokio::test]
    async fn timeout_without_match() {
        // Scenario C: subprocess stays alive but never produces a match.
        let cmd = sh("sleep 30");
        let err = scan_subprocess(cmd, 1).await.unwrap_err();
        assert!(matches!(err, PandlError::CaptureTimeout(1)));
    }

    #[tokio::test]
    async fn early_exit_is_capture_error() {
        let cmd = sh("echo 'no token here'");
        let err = scan_subprocess(cmd, 10).await.unwrap_err();
        assert!(matches!(err, PandlError::CaptureError(_)));
    }

    #[tokio::test]
    async fn missing_binary_is_capture_error() {
        let cmd = Command::new("definitely-not-a-real-binary-pandl");
        let err = scan_subprocess(cmd, 5).await.unwrap_err();
        assert!(matches!(err, PandlError::CaptureError(_)));
    }

    #[tokio::test]
    async fn token_charset_stops_at_delimiters() {
        let cmd = sh("echo 'pan_auth=tok.en-1&other=2'; sleep 30");
        let token = scan_subprocess(cmd, 10).await.unwrap();
        assert_eq!(token, "tok.en-1");
    }
}
