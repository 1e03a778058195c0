mod cli;
mod config;
mod domain;
mod infra;
mod workflows;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::time::Instant;
use tracing::{error, info, warn};

use cli::Cli;
use config::Settings;
use domain::wanted::WantedShows;
use infra::disk::{scan_tv_roots, LocalLibrary, NzbArchiveDir};
use infra::feeds::{read_feed_list, RssFeedReader};
use infra::logging;
use infra::sabnzbd::SabClient;
use workflows::collector::collect_reports;
use workflows::pipeline::Pipeline;
use workflows::summary::RunSummary;

const BANNER_RULE: &str = "=====================================================================";

fn main() {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.clone().unwrap_or_else(config::default_log_dir);
    let guard = logging::init(&log_dir);

    let started = Instant::now();
    info!("{BANNER_RULE}");
    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    info!("Current System Time: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{BANNER_RULE}");

    let mut summary = RunSummary::new();
    let result = run(&cli, &mut summary);
    if let Err(e) = &result {
        error!("{e}");
        error!("{e:?}");
    }

    summary.log(started.elapsed());

    // Flush the log file before a possible exit.
    drop(guard);
    if result.is_err() {
        std::process::exit(1);
    }
}

fn run(cli: &Cli, summary: &mut RunSummary) -> Result<()> {
    info!("Loading configuration...");
    let config_path = config::resolve_config_path(cli.config.as_deref());
    let settings = Settings::load(&config_path)?;
    let wanted = WantedShows::new(scan_tv_roots(&settings.tv_roots)?);
    let sab = SabClient::new(settings.sabnzbd.clone())?;
    let archive = NzbArchiveDir::new(settings.nzb_dir.clone());

    info!("Loading RSS feed list from {}", settings.feed_list.display());
    let feeds = read_feed_list(&settings.feed_list)?;
    let reports = collect_reports(&RssFeedReader::new(), &feeds);

    if wanted.is_empty() {
        warn!("No show folders found under the TV roots, nothing is wanted");
    }
    info!("Watching {} shows", wanted.len());
    info!("Season ignore rules: {}", settings.ignore_rules.len());
    if cli.dry_run {
        info!("Dry run, nothing will be added to the queue");
    }

    let pipeline = Pipeline::new(&settings, &wanted, &LocalLibrary, &sab, &archive)
        .dry_run(cli.dry_run);
    for report in &reports {
        pipeline.process(report, summary);
    }

    Ok(())
}
