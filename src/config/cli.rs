use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "streams-bot")]
#[command(about = "Syncs live streamer embeds into a Discord channel")]
pub struct CliArgs {
    #[arg(long, default_value = "streams-bot-config.json", help = "Path to config file")]
    pub config: PathBuf,

    #[arg(long, help = "Override the sync interval in seconds")]
    pub interval: Option<u64>,

    #[arg(long, help = "Run a single sync cycle and exit")]
    pub once: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
