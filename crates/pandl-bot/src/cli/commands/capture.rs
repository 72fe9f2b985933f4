//! The `capture` command: one manual capture attempt.

use anyhow::Result;
use pandl_core::capture;
use pandl_core::config::PandlConfig;

pub async fn run_capture(cfg: &PandlConfig, timeout_override: Option<u64>) -> Result<()> {
    let timeout = timeout_override.unwrap_or(cfg.capture.timeout_secs);
    match capture::capture_token(timeout, cfg.capture.port, &cfg.capture.interface).await {
        Ok(token) => {
            println!("{token}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
