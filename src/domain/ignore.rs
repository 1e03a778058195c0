use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    pub show_name: String,
    pub max_ignored_season: u32,
}

/// Per-show season thresholds, parsed from `Show1=N;Show2=M;`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    pub fn parse(value: &str) -> Result<Self> {
        let mut rules = Vec::new();

        for entry in value.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((show_name, season)) = entry.split_once('=') else {
                bail!("Invalid ignore rule '{entry}', expected 'Show Name=Season'");
            };
            let show_name = show_name.trim();
            if show_name.is_empty() {
                bail!("Invalid ignore rule '{entry}', show name is empty");
            }
            let max_ignored_season = season
                .trim()
                .parse()
                .with_context(|| format!("Invalid season in ignore rule '{entry}'"))?;

            rules.push(IgnoreRule {
                show_name: show_name.to_string(),
                max_ignored_season,
            });
        }

        Ok(Self { rules })
    }

    pub fn is_ignored(&self, show_name: &str, season: u32) -> bool {
        self.rules.iter().any(|rule| {
            rule.show_name.eq_ignore_ascii_case(show_name.trim()) && season <= rule.max_ignored_season
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
