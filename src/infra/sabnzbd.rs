use anyhow::Result;
use serde::Deserialize;
use std::cell::OnceCell;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::SabnzbdSettings;
use crate::workflows::pipeline::DownloadQueue;

#[derive(Debug, Error)]
pub enum SabError {
    #[error("sabnzbd request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sabnzbd returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid sabnzbd queue document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("sabnzbd queue error: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
struct QueueResponse {
    queue: Option<Queue>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Queue {
    #[serde(default)]
    slots: Vec<Slot>,
}

#[derive(Debug, Deserialize)]
struct Slot {
    #[serde(default)]
    filename: String,
}

/// Blocking client for the SABnzbd `api` endpoint.
pub struct SabClient {
    client: reqwest::blocking::Client,
    api_url: Url,
    settings: SabnzbdSettings,
    queue_snapshot: QueueSnapshot,
}

/// Holds the first successful queue fetch of a run when caching is on.
/// A failed fetch is never stored, so the next check asks again.
#[derive(Debug)]
struct QueueSnapshot {
    enabled: bool,
    filenames: OnceCell<Vec<String>>,
}

impl QueueSnapshot {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            filenames: OnceCell::new(),
        }
    }

    fn get_or_fetch(
        &self,
        fetch: impl FnOnce() -> Result<Vec<String>, SabError>,
    ) -> Result<Vec<String>, SabError> {
        if !self.enabled {
            return fetch();
        }
        if let Some(filenames) = self.filenames.get() {
            return Ok(filenames.clone());
        }
        let fetched = fetch()?;
        Ok(self.filenames.get_or_init(|| fetched).clone())
    }
}

impl SabClient {
    pub fn new(settings: SabnzbdSettings) -> Result<Self> {
        Ok(Self {
            client: reqwest::blocking::Client::new(),
            api_url: settings.api_url()?,
            queue_snapshot: QueueSnapshot::new(settings.cache_queue),
            settings,
        })
    }

    fn request_url(&self, action: &[(&str, String)]) -> Url {
        let mut url = self.api_url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in action {
                query.append_pair(key, value);
            }
            query
                .append_pair("priority", &self.settings.priority.to_string())
                .append_pair("apikey", &self.settings.api_key)
                .append_pair("ma_username", &self.settings.username)
                .append_pair("ma_password", &self.settings.password);
        }
        url
    }

    fn get(&self, action: &[(&str, String)]) -> Result<String, SabError> {
        let response = self.client.get(self.request_url(action)).send()?;
        if !response.status().is_success() {
            return Err(SabError::Status(response.status()));
        }
        Ok(response.text()?)
    }

    fn fetch_queue(&self) -> Result<Vec<String>, SabError> {
        let body = self.get(&[
            ("mode", "queue".to_string()),
            ("output", "json".to_string()),
        ])?;
        parse_queue(&body)
    }
}

impl DownloadQueue for SabClient {
    fn queued_filenames(&self) -> Result<Vec<String>> {
        let filenames = self.queue_snapshot.get_or_fetch(|| {
            let filenames = self.fetch_queue()?;
            debug!(slots = filenames.len(), "Fetched sabnzbd queue");
            Ok(filenames)
        })?;
        Ok(filenames)
    }

    fn enqueue(&self, report_id: u64) -> Result<String> {
        let response = self.get(&[
            ("mode", "addid".to_string()),
            ("name", report_id.to_string()),
        ])?;
        Ok(response.replace(|c: char| c == '\r' || c == '\n', ""))
    }
}

/// Filenames of every non-empty slot. A document without a queue is an
/// empty queue; an `error` field is reported as [`SabError::Api`].
fn parse_queue(body: &str) -> Result<Vec<String>, SabError> {
    let response: QueueResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(SabError::Api(error));
    }

    Ok(response
        .queue
        .map(|queue| {
            queue
                .slots
                .into_iter()
                .map(|slot| slot.filename.trim().to_string())
                .filter(|filename| !filename.is_empty())
                .collect()
        })
        .unwrap_or_default())
}
