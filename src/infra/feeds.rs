use anyhow::{anyhow, bail, Context, Result};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::domain::models::{FeedInfo, FeedItem};
use crate::workflows::collector::FeedReader;

const UNNAMED_FEED: &str = "UN-NAMED";

pub fn read_feed_list(path: &Path) -> Result<Vec<FeedInfo>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed list {}", path.display()))?;
    Ok(parse_feed_list(&content))
}

/// One feed per line, either `name|url` or a bare `url`.
pub fn parse_feed_list(content: &str) -> Vec<FeedInfo> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.split_once('|') {
            Some((name, url)) => FeedInfo {
                name: name.trim().to_string(),
                url: url.trim().to_string(),
            },
            None => FeedInfo {
                name: UNNAMED_FEED.to_string(),
                url: line.to_string(),
            },
        })
        .collect()
}

/// Reads RSS 2.0 feeds from http(s) URLs, `file://` URLs or plain paths.
#[derive(Default)]
pub struct RssFeedReader {
    client: reqwest::blocking::Client,
}

impl RssFeedReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn fetch(&self, url: Url) -> Result<rss::Channel> {
        let response = self.client.get(url.clone()).send()?;
        if !response.status().is_success() {
            bail!("Feed download failed: HTTP {} from {url}", response.status());
        }
        let bytes = response.bytes()?;
        rss::Channel::read_from(&bytes[..]).with_context(|| format!("Invalid RSS document at {url}"))
    }
}

impl FeedReader for RssFeedReader {
    fn read(&self, feed: &FeedInfo) -> Result<Vec<FeedItem>> {
        let channel = match Url::parse(&feed.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => self.fetch(url)?,
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| anyhow!("Invalid file URL {url}"))?;
                read_channel_file(&path)?
            }
            // Anything else, including Windows drive paths, is a local file.
            _ => read_channel_file(Path::new(&feed.url))?,
        };

        Ok(channel
            .items()
            .iter()
            .map(|item| FeedItem {
                title: item.title().unwrap_or_default().trim().to_string(),
                link: item.link().map(|link| link.trim().to_string()),
            })
            .collect())
    }
}

fn read_channel_file(path: &Path) -> Result<rss::Channel> {
    let file =
        File::open(path).with_context(|| format!("Failed to open feed {}", path.display()))?;
    rss::Channel::read_from(BufReader::new(file))
        .with_context(|| format!("Invalid RSS document {}", path.display()))
}
