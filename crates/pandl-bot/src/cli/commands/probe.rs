//! The `probe` command: one liveness check against the drive API.

use std::sync::Arc;

use anyhow::Result;
use pandl_core::config::PandlConfig;
use pandl_core::credential::{self, CredentialStore};
use pandl_core::drive::DriveClient;

pub async fn run_probe(cfg: &PandlConfig) -> Result<()> {
    let store = Arc::new(CredentialStore::new(cfg.auth_token.clone()));
    let drive = DriveClient::new(cfg, store)?;
    if credential::probe_liveness(&drive).await {
        println!("credential accepted");
    } else {
        println!("credential rejected");
    }
    Ok(())
}
