use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::domain::models::EpisodeIdentifier;
use crate::domain::sanitize::Sanitizer;

/// Where an episode should live on disk: the folder to look in and a glob
/// (without extension) that any copy of the episode would match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeLocation {
    pub directory: PathBuf,
    pub file_mask: String,
}

/// A user naming pattern such as `%sn/Season %s/%sn - %sx%0e - %en.%ext`.
///
/// Both `/` and `\` separate folders, so Windows style templates keep
/// working on other platforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTemplate {
    pattern: String,
}

impl NamingTemplate {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Returns `None` for [`EpisodeIdentifier::Unsupported`].
    pub fn render(
        &self,
        tv_root: &Path,
        episode: &EpisodeIdentifier,
        sanitizer: &Sanitizer,
    ) -> Option<EpisodeLocation> {
        let (directory_tokens, mask_tokens) = substitutions(episode, sanitizer)?;
        let (folders, file_name) = self.split();

        let directory = folders
            .iter()
            .map(|folder| expand(folder, &directory_tokens))
            .fold(tv_root.to_path_buf(), |path, folder| path.join(folder));

        Some(EpisodeLocation {
            directory,
            file_mask: expand(file_name, &mask_tokens),
        })
    }

    fn split(&self) -> (Vec<&str>, &str) {
        match self.pattern.rfind(is_separator) {
            Some(index) => {
                let folders = self.pattern[..index]
                    .split(is_separator)
                    .filter(|folder| !folder.is_empty())
                    .collect();
                (folders, &self.pattern[index + 1..])
            }
            None => (Vec::new(), self.pattern.as_str()),
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

type Tokens = Vec<(&'static str, String)>;

fn substitutions(episode: &EpisodeIdentifier, sanitizer: &Sanitizer) -> Option<(Tokens, Tokens)> {
    let wildcard = || "*".to_string();

    match episode {
        EpisodeIdentifier::Standard {
            show_name,
            season,
            episode,
        } => {
            let name = sanitizer.sanitize(show_name);
            let numbers = [
                ("%0s", format!("{season:02}")),
                ("%s", season.to_string()),
                ("%0e", format!("{episode:02}")),
                ("%e", episode.to_string()),
            ];

            let mut directory = vec![
                ("%sn", name.clone()),
                ("%s.n", name.replace(' ', ".")),
                ("%s_n", name.replace(' ', "_")),
                ("%en", "%en".to_string()),
                ("%e.n", "%e.n".to_string()),
                ("%e_n", "%e_n".to_string()),
                (".%ext", String::new()),
            ];
            directory.extend(numbers.clone());

            let mut mask = vec![
                ("%sn", wildcard()),
                ("%s.n", wildcard()),
                ("%s_n", wildcard()),
                ("%en", wildcard()),
                ("%e.n", wildcard()),
                ("%e_n", wildcard()),
                (".%ext", String::new()),
            ];
            mask.extend(numbers);

            Some((directory, mask))
        }
        EpisodeIdentifier::Daily {
            show_name,
            year,
            month,
            day,
        } => {
            let name = sanitizer.sanitize(show_name);
            let numbers = [
                ("%y", year.to_string()),
                ("%0m", format!("{month:02}")),
                ("%m", month.to_string()),
                ("%0d", format!("{day:02}")),
                ("%d", day.to_string()),
            ];

            let mut directory = vec![
                ("%t", name.clone()),
                ("%.t", name.replace(' ', ".")),
                ("%_t", name.replace(' ', "_")),
                ("%desc", "%desc".to_string()),
                ("%.desc", "%.desc".to_string()),
                ("%_desc", "%_desc".to_string()),
                (".%ext", String::new()),
            ];
            directory.extend(numbers.clone());

            let mut mask = vec![
                ("%t", wildcard()),
                ("%.t", wildcard()),
                ("%_t", wildcard()),
                ("%desc", wildcard()),
                ("%.desc", wildcard()),
                ("%_desc", wildcard()),
                (".%ext", wildcard()),
            ];
            mask.extend(numbers);

            Some((directory, mask))
        }
        EpisodeIdentifier::Unsupported { .. } => None,
    }
}

/// Single left-to-right pass; at each position the longest token wins and
/// substituted text is never scanned again.
fn expand(text: &str, tokens: &[(&'static str, String)]) -> String {
    let mut ordered: Vec<&(&str, String)> = tokens.iter().collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        match ordered.iter().find(|(token, _)| rest.starts_with(token)) {
            Some((token, value)) => {
                output.push_str(value);
                rest = &rest[token.len()..];
            }
            None => {
                output.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    output
}

/// Compiles a `*`/`?` file glob into a case-insensitive, anchored regex.
pub fn glob_regex(glob: &str) -> Result<Regex> {
    let mut pattern = String::from("(?i)^");
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');
    Ok(Regex::new(&pattern)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(show_name: &str, season: u32, episode: u32) -> EpisodeIdentifier {
        EpisodeIdentifier::Standard {
            show_name: show_name.to_string(),
            season,
            episode,
        }
    }

    fn daily(show_name: &str, year: u32, month: u32, day: u32) -> EpisodeIdentifier {
        EpisodeIdentifier::Daily {
            show_name: show_name.to_string(),
            year,
            month,
            day,
        }
    }

    fn render(pattern: &str, episode: &EpisodeIdentifier) -> EpisodeLocation {
        NamingTemplate::new(pattern)
            .render(Path::new("/tv"), episode, &Sanitizer::new(false))
            .unwrap()
    }

    #[test]
    fn test_render_season_padding() {
        let location = render("%sn/Season %0s/%s-%0s", &standard("Show", 3, 7));
        assert_eq!(location.directory, Path::new("/tv/Show/Season 03"));
        assert_eq!(location.file_mask, "3-03");
    }

    #[test]
    fn test_render_standard_template() {
        let location = render(
            "%sn\\Season %s\\%s.n - %sx%0e - %en.%ext",
            &standard("The Office: US", 5, 4),
        );
        assert_eq!(location.directory, Path::new("/tv/The Office US/Season 5"));
        assert_eq!(location.file_mask, "* - 5x04 - *");
    }

    #[test]
    fn test_render_show_name_variants() {
        let location = render("%s.n/%s_n/%sn/S%0sE%0e", &standard("My Show", 1, 12));
        assert_eq!(location.directory, Path::new("/tv/My.Show/My_Show/My Show"));
        assert_eq!(location.file_mask, "S01E12");
    }

    #[test]
    fn test_render_does_not_rescan_substituted_values() {
        let location = render("%sn/%e", &standard("100%s Real", 2, 9));
        assert_eq!(location.directory, Path::new("/tv/100%s Real"));
        assert_eq!(location.file_mask, "9");
    }

    #[test]
    fn test_render_daily_template() {
        let location = render(
            "%t/%y/%.t - %y-%0m-%0d - %desc.%ext",
            &daily("The Daily Show", 2009, 6, 3),
        );
        assert_eq!(location.directory, Path::new("/tv/The Daily Show/2009"));
        assert_eq!(location.file_mask, "* - 2009-06-03 - **");
    }

    #[test]
    fn test_render_daily_unpadded() {
        let location = render("%_t %m.%d.%y", &daily("Late Show", 2010, 1, 5));
        assert_eq!(location.directory, Path::new("/tv"));
        assert_eq!(location.file_mask, "* 1.5.2010");
    }

    #[test]
    fn test_render_unsupported_is_none() {
        let unsupported = EpisodeIdentifier::Unsupported {
            reason: "nope".to_string(),
        };
        assert!(NamingTemplate::new("%sn")
            .render(Path::new("/tv"), &unsupported, &Sanitizer::default())
            .is_none());
    }

    #[test]
    fn test_rendered_mask_matches_named_file() {
        let template = "%sn/Season %s/%sn - %sx%0e - %en.%ext";
        let episodes = [
            standard("Show Name", 1, 2),
            standard("Lost", 10, 117),
            standard("A: B", 0, 0),
        ];
        let sanitizer = Sanitizer::new(false);

        for episode in &episodes {
            let EpisodeIdentifier::Standard {
                show_name,
                season,
                episode: number,
            } = episode
            else {
                unreachable!()
            };
            let file_name = format!(
                "{} - {}x{:02} - Some Title.mkv",
                sanitizer.sanitize(show_name),
                season,
                number
            );

            let location = NamingTemplate::new(template)
                .render(Path::new("/tv"), episode, &sanitizer)
                .unwrap();
            let glob = glob_regex(&format!("{}.mkv", location.file_mask)).unwrap();
            assert!(glob.is_match(&file_name), "{file_name} vs {}", location.file_mask);
        }
    }

    #[test]
    fn test_glob_regex() {
        let glob = glob_regex("* - 1x0?.avi").unwrap();
        assert!(glob.is_match("Show - 1x02.avi"));
        assert!(glob.is_match("SHOW - 1X02.AVI"));
        assert!(!glob.is_match("Show - 1x02.avi.part"));
        assert!(!glob.is_match("Show - 1x10.avi"));

        let literal = glob_regex("a+b (1).mkv").unwrap();
        assert!(literal.is_match("a+b (1).mkv"));
        assert!(!literal.is_match("aab (1).mkv"));
    }
}
