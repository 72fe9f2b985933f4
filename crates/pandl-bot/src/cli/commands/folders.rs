//! The `folders` command: list the destination folders.

use std::sync::Arc;

use anyhow::Result;
use pandl_core::config::PandlConfig;
use pandl_core::credential::CredentialStore;
use pandl_core::drive::DriveClient;

pub async fn run_folders(cfg: &PandlConfig) -> Result<()> {
    let store = Arc::new(CredentialStore::new(cfg.auth_token.clone()));
    let drive = DriveClient::new(cfg, store)?;
    let folders = drive.list_folders(&cfg.parent_folder_id).await?;
    if folders.is_empty() {
        println!("no sub-folders under {}", cfg.parent_folder_id);
        return Ok(());
    }
    for folder in folders {
        println!("{}\t{}", folder.id, folder.name);
    }
    Ok(())
}
