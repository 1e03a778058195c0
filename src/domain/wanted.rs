use std::collections::HashMap;

use crate::domain::models::WantedShow;

/// Monitored shows keyed by lowercased folder name.
#[derive(Debug, Clone, Default)]
pub struct WantedShows {
    by_name: HashMap<String, WantedShow>,
}

impl WantedShows {
    /// Earlier entries win when two roots hold a folder with the same name.
    pub fn new(shows: impl IntoIterator<Item = WantedShow>) -> Self {
        let mut by_name = HashMap::new();
        for show in shows {
            by_name.entry(show.name.to_lowercase()).or_insert(show);
        }
        Self { by_name }
    }

    /// `name` must already be sanitized; folders on disk can only hold
    /// sanitized names.
    pub fn find(&self, name: &str) -> Option<&WantedShow> {
        self.by_name.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
