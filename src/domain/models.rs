use std::fmt;
use std::path::PathBuf;

/// A feed item reduced to its numeric report id and raw title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeIdentifier {
    Standard {
        show_name: String,
        season: u32,
        episode: u32,
    },
    Daily {
        show_name: String,
        year: u32,
        month: u32,
        day: u32,
    },
    Unsupported {
        reason: String,
    },
}

impl EpisodeIdentifier {
    /// The same episode filed under `show_name`. Unsupported titles are
    /// returned unchanged.
    pub fn with_show_name(&self, show_name: &str) -> Self {
        let mut episode = self.clone();
        match &mut episode {
            EpisodeIdentifier::Standard { show_name: name, .. }
            | EpisodeIdentifier::Daily { show_name: name, .. } => {
                *name = show_name.to_string();
            }
            EpisodeIdentifier::Unsupported { .. } => {}
        }
        episode
    }
}

impl fmt::Display for EpisodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeIdentifier::Standard {
                show_name,
                season,
                episode,
            } => write!(f, "{show_name} S{season:02}E{episode:02}"),
            EpisodeIdentifier::Daily {
                show_name,
                year,
                month,
                day,
            } => write!(f, "{show_name} {year}-{month:02}-{day:02}"),
            EpisodeIdentifier::Unsupported { reason } => write!(f, "unsupported ({reason})"),
        }
    }
}

/// A monitored show: a directory found directly under one of the TV roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WantedShow {
    pub name: String,
    pub root: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Queue,
    SkipNotWanted,
    SkipOnDisk,
    SkipSeasonIgnored,
    SkipAlreadyQueued,
    SkipInArchive,
    SkipUnsupportedTitle,
}

impl Decision {
    pub const ALL: [Decision; 7] = [
        Decision::Queue,
        Decision::SkipNotWanted,
        Decision::SkipOnDisk,
        Decision::SkipSeasonIgnored,
        Decision::SkipAlreadyQueued,
        Decision::SkipInArchive,
        Decision::SkipUnsupportedTitle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Decision::Queue => "queued",
            Decision::SkipNotWanted => "not wanted",
            Decision::SkipOnDisk => "on disk",
            Decision::SkipSeasonIgnored => "season ignored",
            Decision::SkipAlreadyQueued => "already queued",
            Decision::SkipInArchive => "in archive",
            Decision::SkipUnsupportedTitle => "unsupported title",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedInfo {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_show_name() {
        let standard = EpisodeIdentifier::Standard {
            show_name: "LOST".to_string(),
            season: 4,
            episode: 11,
        };
        assert_eq!(
            standard.with_show_name("Lost"),
            EpisodeIdentifier::Standard {
                show_name: "Lost".to_string(),
                season: 4,
                episode: 11,
            }
        );

        let daily = EpisodeIdentifier::Daily {
            show_name: "the daily show".to_string(),
            year: 2009,
            month: 6,
            day: 3,
        };
        assert_eq!(daily.with_show_name("The Daily Show").to_string(), "The Daily Show 2009-06-03");

        let unsupported = EpisodeIdentifier::Unsupported {
            reason: "no season".to_string(),
        };
        assert_eq!(unsupported.with_show_name("Lost"), unsupported);
    }
}
