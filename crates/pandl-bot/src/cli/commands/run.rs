//! The `run` command: health loop + Telegram poll loop.

use std::sync::Arc;

use anyhow::{ensure, Result};
use pandl_core::config::PandlConfig;
use pandl_core::credential::{self, CredentialStore};
use pandl_core::drive::DriveClient;

use crate::handler::Handler;
use crate::telegram::TelegramClient;

pub async fn run_bot(cfg: PandlConfig) -> Result<()> {
    ensure!(!cfg.api_host.is_empty(), "api_host is not configured");
    ensure!(!cfg.bot.token.is_empty(), "bot.token is not configured");

    let store = Arc::new(CredentialStore::new(cfg.auth_token.clone()));
    let drive = DriveClient::new(&cfg, store)?;
    let telegram = TelegramClient::new(&cfg.bot.token)?;

    // Background liveness/recapture cycle; foreground handling never waits
    // on it.
    tokio::spawn(credential::health_loop(drive.clone(), cfg.clone()));

    let handler = Handler::new(cfg, drive, telegram.clone());
    tracing::info!("bot started");

    let mut offset = 0i64;
    loop {
        let updates = match telegram.get_updates(offset).await {
            Ok(updates) => updates,
            Err(err) => {
                tracing::warn!("poll failed, retrying: {err:#}");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }
        };
        for update in updates {
            offset = offset.max(update.update_id + 1);
            handler.handle_update(update).await;
        }
    }
}
