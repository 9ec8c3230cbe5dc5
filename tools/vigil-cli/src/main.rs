//! Vigil CLI — watch and record RTSP streams from the terminal.
//!
//! Usage:
//!   vigil watch <URL>          Watch a live stream
//!   vigil watch <URL> --record Watch and record simultaneously
//!   vigil check                Check engine capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "vigil",
    about = "RTSP live view with on-demand recording",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a live RTSP stream
    Watch {
        /// RTSP stream URL
        url: String,

        /// Start recording as soon as the stream is up
        #[arg(long)]
        record: bool,

        /// Override the recordings directory
        #[arg(long)]
        recordings_dir: Option<PathBuf>,
    },

    /// Check engine capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    vigil_common::logging::init_logging(&vigil_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Watch {
            url,
            record,
            recordings_dir,
        } => commands::watch::run(url, record, recordings_dir).await,
        Commands::Check => commands::check::run(),
    }
}
