use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sabsync", version)]
#[command(about = "Queue wanted TV episodes from RSS feeds in SABnzbd")]
pub struct Cli {
    /// Config file (defaults to $SABSYNC_CONFIG, then the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the per-run log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Run every check but do not add anything to the queue
    #[arg(long)]
    pub dry_run: bool,
}
