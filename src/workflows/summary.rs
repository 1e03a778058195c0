use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

use crate::domain::models::Decision;

/// What a run did, printed at the very end even when the run failed.
#[derive(Debug, Default)]
pub struct RunSummary {
    notes: Vec<String>,
    queued: Vec<String>,
    decisions: HashMap<Decision, usize>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }

    pub fn record(&mut self, decision: Decision) {
        *self.decisions.entry(decision).or_default() += 1;
    }

    pub fn add_queued(&mut self, title: &str, response: &str) {
        self.queued.push(format!("{title}: {response}"));
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn queued(&self) -> &[String] {
        &self.queued
    }

    pub fn count(&self, decision: Decision) -> usize {
        self.decisions.get(&decision).copied().unwrap_or(0)
    }

    pub fn log(&self, elapsed: Duration) {
        info!("=====================================================================");
        for note in &self.notes {
            info!("{note}");
        }
        for item in &self.queued {
            info!("Queued for download: {item}");
        }
        info!("Number of reports added to the queue: {}", self.queued.len());

        for decision in Decision::ALL {
            let count = self.count(decision);
            if count > 0 {
                info!(decision = decision.label(), count, "Decision count");
            }
        }
        info!(
            "Process completed. Duration {:.1}s",
            elapsed.as_secs_f64()
        );
    }
}
