use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Passive capture parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Port the drive API traffic flows over (BPF filter `port N`).
    pub port: u16,
    /// Interface to listen on; "any" captures on all interfaces.
    pub interface: String,
    /// Wall-clock budget for one capture attempt, in seconds.
    pub timeout_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            port: 2345,
            interface: "any".to_string(),
            timeout_secs: 60,
        }
    }
}

/// File-selection parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Minimum file size in bytes for a file to be worth downloading.
    pub min_file_size: u64,
    /// If true, a torrent with no file over the threshold downloads
    /// everything instead of failing with NoEligibleFiles.
    pub select_all_fallback: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_file_size: 200 * 1024 * 1024,
            select_all_fallback: false,
        }
    }
}

/// Telegram transport settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot API token.
    pub token: String,
    /// Only messages from this chat are handled.
    pub chat_id: i64,
}

/// Global configuration loaded from `~/.config/pandl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PandlConfig {
    /// Drive API base, e.g. `http://nas.local:2345` (no trailing slash).
    pub api_host: String,
    /// Seed value for the session credential; replaced at runtime when a
    /// capture succeeds.
    pub auth_token: String,
    /// Optional Cookie header forwarded on every drive call.
    #[serde(default)]
    pub cookie: Option<String>,
    /// Optional x-syno-token header (DSM-hosted drives).
    #[serde(default)]
    pub syno_token: Option<String>,
    /// Target space identifier for created tasks.
    pub space: String,
    /// Folder whose sub-folders are offered as destinations.
    pub parent_folder_id: String,
    /// Seconds between liveness-probe cycles.
    #[serde(default = "default_health_interval")]
    pub health_check_interval_secs: u64,
    /// Seconds to wait between successive task creations in one batch.
    /// Rate limiting against the provider, not tunable below by accident.
    #[serde(default = "default_dispatch_delay")]
    pub dispatch_delay_secs: u64,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

fn default_health_interval() -> u64 {
    300
}

fn default_dispatch_delay() -> u64 {
    10
}

impl Default for PandlConfig {
    fn default() -> Self {
        Self {
            api_host: String::new(),
            auth_token: String::new(),
            cookie: None,
            syno_token: None,
            space: String::new(),
            parent_folder_id: String::new(),
            health_check_interval_secs: default_health_interval(),
            dispatch_delay_secs: default_dispatch_delay(),
            capture: CaptureConfig::default(),
            selection: SelectionConfig::default(),
            bot: BotConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pandl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PandlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PandlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PandlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
