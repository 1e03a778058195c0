use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::domain::models::{Decision, EpisodeIdentifier, Report};
use crate::domain::title::parse_title;
use crate::domain::wanted::WantedShows;
use crate::workflows::summary::RunSummary;

/// Finds an existing copy of an episode in the library.
pub trait EpisodeProbe {
    fn find_match(&self, directory: &Path, file_glob: &str) -> Result<Option<PathBuf>>;
}

pub trait DownloadQueue {
    fn queued_filenames(&self) -> Result<Vec<String>>;
    /// Returns the raw response of the download client.
    fn enqueue(&self, report_id: u64) -> Result<String>;
}

/// Archive of NZBs imported by earlier runs, keyed by file name without the
/// `.nzb.gz` suffix.
pub trait NzbArchive {
    fn contains(&self, nzb_name: &str) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    /// Lines worth repeating in the run summary.
    pub notes: Vec<String>,
}

impl Verdict {
    fn new(decision: Decision) -> Self {
        Self {
            decision,
            notes: Vec::new(),
        }
    }
}

/// Runs the ordered checks for one report at a time. The first check that
/// matches decides and nothing after it runs; the download queue is only
/// asked once every local check has passed.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    wanted: &'a WantedShows,
    library: &'a dyn EpisodeProbe,
    queue: &'a dyn DownloadQueue,
    archive: &'a dyn NzbArchive,
    dry_run: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        settings: &'a Settings,
        wanted: &'a WantedShows,
        library: &'a dyn EpisodeProbe,
        queue: &'a dyn DownloadQueue,
        archive: &'a dyn NzbArchive,
    ) -> Self {
        Self {
            settings,
            wanted,
            library,
            queue,
            archive,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Decides on the report and, when it should be queued, sends it to
    /// the download queue.
    pub fn process(&self, report: &Report, summary: &mut RunSummary) -> Decision {
        let verdict = self.evaluate(report);
        summary.record(verdict.decision);
        for note in verdict.notes {
            summary.note(note);
        }

        if verdict.decision == Decision::Queue {
            self.enqueue(report, summary);
        }
        verdict.decision
    }

    pub fn decide(&self, report: &Report) -> Decision {
        self.evaluate(report).decision
    }

    pub fn evaluate(&self, report: &Report) -> Verdict {
        info!("----------------------------------------------------------------");
        info!(report_id = report.id, "Verifying '{}'", report.title);

        let sanitizer = &self.settings.sanitizer;
        let episode = parse_title(&report.title);
        let (show_name, template) = match &episode {
            EpisodeIdentifier::Standard { show_name, .. } => {
                (show_name, &self.settings.tv_template)
            }
            EpisodeIdentifier::Daily { show_name, .. } => {
                (show_name, &self.settings.tv_daily_template)
            }
            EpisodeIdentifier::Unsupported { reason } => {
                info!(report_id = report.id, "Unsupported Title: {} - {}", report.title, reason);
                return Verdict::new(Decision::SkipUnsupportedTitle);
            }
        };

        debug!(report_id = report.id, %episode, "Parsed title");

        let Some(show) = self.wanted.find(&sanitizer.sanitize(show_name)) else {
            info!("'{show_name}' is not being watched.");
            return Verdict::new(Decision::SkipNotWanted);
        };

        // The folder on disk is named by the show's directory, not by the
        // casing of the report title.
        let filed = episode.with_show_name(&show.name);
        let Some(location) = template.render(&show.root, &filed, sanitizer) else {
            return Verdict::new(Decision::SkipUnsupportedTitle);
        };

        for extension in &self.settings.video_extensions {
            let file_glob = format!("{}{}", location.file_mask, extension);
            match self.library.find_match(&location.directory, &file_glob) {
                Ok(Some(path)) => {
                    let note = format!("Episode in disk. '{}'", path.display());
                    info!("{note}");
                    return Verdict {
                        decision: Decision::SkipOnDisk,
                        notes: vec![note],
                    };
                }
                Ok(None) => {}
                Err(e) => {
                    error!(
                        report_id = report.id,
                        title = %report.title,
                        directory = %location.directory.display(),
                        error = ?e,
                        "Failed to look for episode on disk"
                    );
                    return Verdict {
                        decision: Decision::SkipOnDisk,
                        notes: vec![format!(
                            "Could not check disk for '{}': {e}",
                            report.title
                        )],
                    };
                }
            }
        }

        if let EpisodeIdentifier::Standard { season, .. } = &episode {
            if self.settings.ignore_rules.is_ignored(show_name, *season) {
                info!("Ignoring '{show_name}' Season '{season}'");
                return Verdict::new(Decision::SkipSeasonIgnored);
            }
        }

        let mut notes = Vec::new();
        let queue_name = sanitizer.sanitize(&report.title).to_lowercase();
        let fetch_name = format!("fetching msgid {} from www.newzbin.com", report.id);
        match self.queue.queued_filenames() {
            Ok(filenames) => {
                let queued = filenames.iter().any(|filename| {
                    let filename = filename.to_lowercase();
                    filename == queue_name || filename == fetch_name
                });
                if queued {
                    let note = format!("Episode in queue - '{}'", report.title);
                    info!("{note}");
                    return Verdict {
                        decision: Decision::SkipAlreadyQueued,
                        notes: vec![note],
                    };
                }
            }
            Err(e) => {
                // Fail open.
                warn!(report_id = report.id, error = ?e, "Failed to check the download queue");
                notes.push(format!(
                    "An error has occurred while checking the queue. {e}"
                ));
            }
        }

        let nzb_name = sanitizer.sanitize(report.title.trim_end_matches('.'));
        info!("Checking for Imported NZB for [{}]", report.title);
        match self.archive.contains(&nzb_name) {
            Ok(false) => {}
            Ok(true) => {
                let note = format!("Episode in archive: {nzb_name}.nzb.gz");
                info!("{note}");
                notes.push(note);
                return Verdict {
                    decision: Decision::SkipInArchive,
                    notes,
                };
            }
            Err(e) => {
                error!(report_id = report.id, title = %report.title, error = ?e, "Failed to check the NZB archive");
                notes.push(format!("Could not check archive for '{}': {e}", report.title));
                return Verdict {
                    decision: Decision::SkipInArchive,
                    notes,
                };
            }
        }

        Verdict {
            decision: Decision::Queue,
            notes,
        }
    }

    fn enqueue(&self, report: &Report, summary: &mut RunSummary) {
        if self.dry_run {
            info!(report_id = report.id, "Dry run, not adding report to the queue");
            summary.add_queued(&report.title, "dry run");
            return;
        }

        info!("Adding report [{}] to the queue.", report.id);
        match self.queue.enqueue(report.id) {
            Ok(response) => {
                info!("Queue Response: [{response}]");
                summary.add_queued(&report.title, &response);
            }
            Err(e) => {
                error!(report_id = report.id, title = %report.title, error = ?e, "Failed to add report to the queue");
                summary.note(format!(
                    "Failed to add report [{}] '{}' to the queue: {e}",
                    report.id, report.title
                ));
            }
        }
    }
}
