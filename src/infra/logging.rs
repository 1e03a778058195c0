use anyhow::Result;
use chrono::Local;
use std::path::Path;
use tracing::warn;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Logs to stdout and to a fresh `MM.dd-HH-mm.txt` file in `log_dir`.
///
/// The returned guard must be held until the end of `main`, otherwise
/// buffered file output is lost. When the log file cannot be created the
/// run continues with stdout only.
pub fn init(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match open_log_file(log_dir) {
        Ok((writer, guard)) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
            warn!(log_dir = %log_dir.display(), error = %e, "File logging disabled");
            None
        }
    }
}

fn open_log_file(log_dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(Local::now().format("%m.%d-%H-%M").to_string())
        .filename_suffix("txt")
        .build(log_dir)?;
    Ok(tracing_appender::non_blocking(appender))
}
