use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{error, info, warn};
use url::Url;

use crate::domain::models::{FeedInfo, FeedItem, Report};

const PASSWORDED_SUFFIX: &str = "(passworded)";

pub trait FeedReader {
    fn read(&self, feed: &FeedInfo) -> Result<Vec<FeedItem>>;
}

/// Accumulates reports across every feed of a run, dropping repeats by id
/// and by title.
#[derive(Debug, Default)]
pub struct ReportCollector {
    reports: Vec<Report>,
    ids: HashSet<u64>,
    titles: HashSet<String>,
}

impl ReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the item was skipped.
    pub fn add_item(&mut self, item: &FeedItem) -> bool {
        if item.title.to_lowercase().ends_with(PASSWORDED_SUFFIX) {
            info!(title = %item.title, "Skipping passworded report");
            return false;
        }

        let Some(id) = item.link.as_deref().and_then(extract_report_id) else {
            warn!(title = %item.title, link = ?item.link, "No report id in item link, skipping");
            return false;
        };

        if self.ids.contains(&id) || self.titles.contains(&item.title) {
            info!(report_id = id, title = %item.title, "Skipping duplicate report");
            return false;
        }

        self.ids.insert(id);
        self.titles.insert(item.title.clone());
        self.reports.push(Report {
            id,
            title: item.title.clone(),
        });
        info!("{}:{}", id, item.title);
        true
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn into_reports(self) -> Vec<Report> {
        self.reports
    }
}

/// Reads every feed in order. A feed that cannot be read is logged and
/// skipped; the others still contribute.
pub fn collect_reports(reader: &dyn FeedReader, feeds: &[FeedInfo]) -> Vec<Report> {
    let mut collector = ReportCollector::new();

    for feed in feeds {
        info!(feed = %feed.name, url = %feed.url, "Downloading feed");
        let items = match reader.read(feed) {
            Ok(items) => items,
            Err(e) => {
                error!(feed = %feed.name, url = %feed.url, error = ?e, "Failed to read feed");
                continue;
            }
        };

        let accepted = items.iter().filter(|item| collector.add_item(item)).count();
        info!(feed = %feed.name, items = items.len(), accepted, "Feed read");
    }

    info!("Download Completed. Total of {} reports found", collector.len());
    collector.into_reports()
}

/// First run of 7 to 10 digits in the path of the item link.
pub fn extract_report_id(link: &str) -> Option<u64> {
    static REPORT_ID: OnceLock<Regex> = OnceLock::new();
    let re = REPORT_ID.get_or_init(|| Regex::new(r"\d{7,10}").expect("valid report id pattern"));

    let path = match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link.to_string(),
    };
    re.find(&path)?.as_str().parse().ok()
}
