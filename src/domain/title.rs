use crate::domain::models::EpisodeIdentifier;

// Announce titles carry a lot of trailing release noise; the episode
// information is always near the start.
const MAX_TITLE_CHARS: usize = 80;

/// Parses a report title such as `Show Name - 1x02 - Group` or
/// `Show Name - 2021-03-15 - Group` into an episode identifier.
///
/// Never fails: anything that does not fit one of the known shapes comes
/// back as [`EpisodeIdentifier::Unsupported`] with the reason.
pub fn parse_title(raw_title: &str) -> EpisodeIdentifier {
    let head: String = raw_title.chars().take(MAX_TITLE_CHARS).collect();
    let segments: Vec<&str> = head.split('-').collect();

    match segments.as_slice() {
        [show, season_episode, _] => standard(show.trim(), season_episode),
        [first, second, third, _] => {
            if second.contains('x') {
                standard(first.trim(), second)
            } else if third.contains('x') {
                let show_name = format!("{}{}", first.trim(), second.trim());
                standard(&show_name, third)
            } else {
                EpisodeIdentifier::Unsupported {
                    reason: "no season/episode segment in a four part title".to_string(),
                }
            }
        }
        [show, year, month, day, _] => daily(show, year, month, day),
        // The release tail itself contained hyphens ("HDTV-x264").
        [show, year, month, day, _, _, ..] if [year, month, day].iter().all(|s| is_number(s)) => {
            daily(show, year, month, day)
        }
        other => EpisodeIdentifier::Unsupported {
            reason: format!("unexpected number of segments: {}", other.len()),
        },
    }
}

fn standard(show_name: &str, season_episode: &str) -> EpisodeIdentifier {
    let parts: Vec<&str> = season_episode.trim().split('x').collect();
    let [season, episode, ..] = parts.as_slice() else {
        return EpisodeIdentifier::Unsupported {
            reason: format!("'{}' is not in NxNN form", season_episode.trim()),
        };
    };

    EpisodeIdentifier::Standard {
        show_name: show_name.to_string(),
        season: lenient_number(season),
        episode: lenient_number(episode),
    }
}

fn daily(show_name: &str, year: &str, month: &str, day: &str) -> EpisodeIdentifier {
    EpisodeIdentifier::Daily {
        show_name: show_name.trim().to_string(),
        year: lenient_number(year),
        month: lenient_number(month),
        day: lenient_number(day),
    }
}

fn lenient_number(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

fn is_number(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}
