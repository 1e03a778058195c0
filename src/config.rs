use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::domain::ignore::IgnoreRules;
use crate::domain::sanitize::Sanitizer;
use crate::domain::template::NamingTemplate;

const DEFAULT_VIDEO_EXTENSIONS: &str = ".avi;.mkv;.mp4";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    tv_root: PathList,
    feeds: PathBuf,
    #[serde(default)]
    ignore_seasons: String,
    video_extensions: Option<String>,
    tv_template: Option<String>,
    tv_daily_template: Option<String>,
    #[serde(default)]
    replace_chars: bool,
    nzb_dir: Option<PathBuf>,
    sabnzbd: SabnzbdSettings,
}

/// `tv_root` may be a TOML array or a single `;` separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PathList {
    Joined(String),
    List(Vec<PathBuf>),
}

impl PathList {
    fn into_paths(self) -> Vec<PathBuf> {
        match self {
            PathList::Joined(joined) => joined
                .split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect(),
            PathList::List(paths) => paths,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SabnzbdSettings {
    pub host: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Fetch the queue once per run instead of once per report.
    #[serde(default)]
    pub cache_queue: bool,
}

impl SabnzbdSettings {
    pub fn api_url(&self) -> Result<Url> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            bail!("Undefined sabnzbd host");
        }
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{host}/api")
        } else {
            format!("http://{host}/api")
        };
        Url::parse(&base).with_context(|| format!("Invalid sabnzbd host '{}'", self.host))
    }
}

/// Everything a run needs, validated once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tv_roots: Vec<PathBuf>,
    pub feed_list: PathBuf,
    pub ignore_rules: IgnoreRules,
    pub video_extensions: Vec<String>,
    pub tv_template: NamingTemplate,
    pub tv_daily_template: NamingTemplate,
    pub sanitizer: Sanitizer,
    pub nzb_dir: Option<PathBuf>,
    pub sabnzbd: SabnzbdSettings,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ConfigFile = toml::from_str(content)?;

        let tv_roots = config.tv_root.into_paths();
        if tv_roots.is_empty() {
            bail!("Undefined tv_root");
        }
        for root in &tv_roots {
            if !root.is_dir() {
                bail!("Invalid TV root folder. {}", root.display());
            }
        }

        if !config.feeds.is_file() {
            bail!("Invalid feed list path. {}", config.feeds.display());
        }

        let tv_template = match config.tv_template {
            Some(t) if !t.trim().is_empty() => NamingTemplate::new(t.trim()),
            _ => bail!("Undefined tv_template"),
        };
        let tv_daily_template = match config.tv_daily_template {
            Some(t) if !t.trim().is_empty() => NamingTemplate::new(t.trim()),
            _ => bail!("Undefined tv_daily_template"),
        };

        let ignore_rules = IgnoreRules::parse(&config.ignore_seasons)?;
        let video_extensions = parse_extensions(
            config
                .video_extensions
                .as_deref()
                .unwrap_or(DEFAULT_VIDEO_EXTENSIONS),
        );
        if video_extensions.is_empty() {
            bail!("Undefined video_extensions");
        }

        config.sabnzbd.api_url()?;

        Ok(Self {
            tv_roots,
            feed_list: config.feeds,
            ignore_rules,
            video_extensions,
            tv_template,
            tv_daily_template,
            sanitizer: Sanitizer::new(config.replace_chars),
            nzb_dir: config.nzb_dir,
            sabnzbd: config.sabnzbd,
        })
    }
}

fn parse_extensions(value: &str) -> Vec<String> {
    value
        .trim_matches(|c| c == ';' || c == ' ')
        .split(';')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .collect()
}

/// `--config`, then `SABSYNC_CONFIG`, then the user config directory.
pub fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_path_buf();
    }
    if let Ok(path) = env::var("SABSYNC_CONFIG") {
        return PathBuf::from(path);
    }
    get_config_dir_path().join("config.toml")
}

pub fn default_log_dir() -> PathBuf {
    get_config_dir_path().join("log")
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("sabsync"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("tv")).unwrap();
        fs::create_dir(temp_dir.path().join("tv2")).unwrap();
        File::create(temp_dir.path().join("feeds.txt")).unwrap();
        temp_dir
    }

    fn config_text(dir: &Path, extra: &str) -> String {
        format!(
            r#"
tv_root = "{tv};{tv2};"
feeds = "{feeds}"
ignore_seasons = "Lost=2;"
tv_template = "%sn/Season %s/%sn - %sx%0e - %en.%ext"
tv_daily_template = "%t/%t - %y-%0m-%0d.%ext"
{extra}

[sabnzbd]
host = "localhost:8080"
api_key = "abc"
"#,
            tv = dir.join("tv").display(),
            tv2 = dir.join("tv2").display(),
            feeds = dir.join("feeds.txt").display(),
        )
    }

    #[test]
    fn test_load_settings() {
        let temp_dir = fixture();
        let settings = Settings::from_toml(&config_text(temp_dir.path(), "")).unwrap();

        assert_eq!(
            settings.tv_roots,
            vec![temp_dir.path().join("tv"), temp_dir.path().join("tv2")]
        );
        assert_eq!(settings.video_extensions, vec![".avi", ".mkv", ".mp4"]);
        assert!(settings.ignore_rules.is_ignored("Lost", 2));
        assert_eq!(settings.sanitizer, Sanitizer::new(false));
        assert_eq!(settings.nzb_dir, None);
        assert_eq!(settings.sabnzbd.priority, 0);
        assert!(!settings.sabnzbd.cache_queue);
    }

    #[test]
    fn test_tv_root_list_and_extensions() {
        let temp_dir = fixture();
        let text = config_text(
            temp_dir.path(),
            "video_extensions = \" .mkv; .m4v ;\"\nreplace_chars = true",
        )
        .replace(
            &format!(
                "tv_root = \"{};{};\"",
                temp_dir.path().join("tv").display(),
                temp_dir.path().join("tv2").display()
            ),
            &format!("tv_root = [\"{}\"]", temp_dir.path().join("tv2").display()),
        );

        let settings = Settings::from_toml(&text).unwrap();
        assert_eq!(settings.tv_roots, vec![temp_dir.path().join("tv2")]);
        assert_eq!(settings.video_extensions, vec![".mkv", ".m4v"]);
        assert_eq!(settings.sanitizer, Sanitizer::new(true));
    }

    #[test]
    fn test_missing_tv_root_is_fatal() {
        let temp_dir = fixture();
        fs::remove_dir(temp_dir.path().join("tv2")).unwrap();
        let err = Settings::from_toml(&config_text(temp_dir.path(), "")).unwrap_err();
        assert!(err.to_string().contains("Invalid TV root folder"));
    }

    #[test]
    fn test_empty_template_is_fatal() {
        let temp_dir = fixture();
        let text = config_text(temp_dir.path(), "")
            .replace("%t/%t - %y-%0m-%0d.%ext", " ");
        let err = Settings::from_toml(&text).unwrap_err();
        assert!(err.to_string().contains("tv_daily_template"));
    }

    #[test]
    fn test_bad_ignore_rule_is_fatal() {
        let temp_dir = fixture();
        let text = config_text(temp_dir.path(), "").replace("Lost=2;", "Lost=two;");
        assert!(Settings::from_toml(&text).is_err());
    }

    #[test]
    fn test_api_url() {
        let mut sab = SabnzbdSettings {
            host: "localhost:8080".to_string(),
            priority: 0,
            api_key: String::new(),
            username: String::new(),
            password: String::new(),
            cache_queue: false,
        };
        assert_eq!(sab.api_url().unwrap().as_str(), "http://localhost:8080/api");

        sab.host = "https://nas.local/sabnzbd/".to_string();
        assert_eq!(
            sab.api_url().unwrap().as_str(),
            "https://nas.local/sabnzbd/api"
        );

        sab.host = " ".to_string();
        assert!(sab.api_url().is_err());
    }

    #[test]
    fn test_resolve_config_path_prefers_cli() {
        let path = resolve_config_path(Some(Path::new("/etc/sabsync.toml")));
        assert_eq!(path, PathBuf::from("/etc/sabsync.toml"));
    }
}
