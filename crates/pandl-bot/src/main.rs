use pandl_core::logging;

mod cli;
mod handler;
mod telegram;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; fall back to stderr so a
    // read-only state dir doesn't kill the bot.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("pandl error: {:#}", err);
        std::process::exit(1);
    }
}
