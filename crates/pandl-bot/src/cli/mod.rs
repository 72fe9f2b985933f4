//! CLI for the pandl bot.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pandl_core::config;

use commands::{run_bot, run_capture, run_folders, run_probe};

/// Top-level CLI for the pandl magnet dispatcher.
#[derive(Debug, Parser)]
#[command(name = "pandl")]
#[command(about = "pandl: magnet dispatch bot for a cloud-drive download API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the bot: credential health loop plus the Telegram poll loop.
    Run,

    /// Run one passive capture attempt and print the token.
    Capture {
        /// Override the configured capture timeout, in seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Probe whether the current credential is still accepted.
    Probe,

    /// List the destination folders offered for dispatch.
    Folders,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config for host {}", cfg.api_host);

        match cli.command {
            CliCommand::Run => run_bot(cfg).await?,
            CliCommand::Capture { timeout } => run_capture(&cfg, timeout).await?,
            CliCommand::Probe => run_probe(&cfg).await?,
            CliCommand::Folders => run_folders(&cfg).await?,
        }

        Ok(())
    }
}
