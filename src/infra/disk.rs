use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::models::WantedShow;
use crate::domain::template::glob_regex;
use crate::workflows::pipeline::{EpisodeProbe, NzbArchive};

/// Every folder directly under each TV root is a monitored show.
pub fn scan_tv_roots(roots: &[PathBuf]) -> Result<Vec<WantedShow>> {
    let mut shows = Vec::new();

    for root in roots {
        let mut names = Vec::new();
        let entries = fs::read_dir(root)
            .with_context(|| format!("Failed to list TV root {}", root.display()))?;
        for entry in entries {
            let entry = entry?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        shows.extend(names.into_iter().map(|name| WantedShow {
            name,
            root: root.clone(),
        }));
    }

    Ok(shows)
}

/// Looks for episode files in the local library.
pub struct LocalLibrary;

impl EpisodeProbe for LocalLibrary {
    fn find_match(&self, directory: &Path, file_glob: &str) -> Result<Option<PathBuf>> {
        if !directory.is_dir() {
            return Ok(None);
        }

        let glob = glob_regex(file_glob)?;
        let mut matches = Vec::new();
        let entries = fs::read_dir(directory)
            .with_context(|| format!("Failed to list {}", directory.display()))?;
        for entry in entries {
            let path = entry?.path();
            let is_match = path
                .file_name()
                .map(|name| glob.is_match(&name.to_string_lossy()))
                .unwrap_or(false);
            if is_match && path.is_file() {
                matches.push(path);
            }
        }

        matches.sort();
        Ok(matches.into_iter().next())
    }
}

/// Folder where SABnzbd keeps a gzipped copy of every NZB it imported.
pub struct NzbArchiveDir {
    directory: Option<PathBuf>,
}

impl NzbArchiveDir {
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }
}

impl NzbArchive for NzbArchiveDir {
    fn contains(&self, nzb_name: &str) -> Result<bool> {
        let Some(directory) = &self.directory else {
            return Ok(false);
        };
        let path = directory.join(format!("{nzb_name}.nzb.gz"));
        path.try_exists()
            .with_context(|| format!("Failed to check {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_scan_tv_roots() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::create_dir(first.path().join("Lost")).unwrap();
        fs::create_dir(first.path().join("Heroes")).unwrap();
        File::create(first.path().join("notes.txt")).unwrap();
        fs::create_dir(second.path().join("The Office")).unwrap();

        let shows = scan_tv_roots(&[first.path().to_path_buf(), second.path().to_path_buf()])
            .unwrap();
        let names: Vec<&str> = shows.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Heroes", "Lost", "The Office"]);
        assert_eq!(shows[2].root, second.path());
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan_tv_roots(&[temp_dir.path().join("missing")]).is_err());
    }

    #[test]
    fn test_find_match() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        File::create(dir.join("Lost - 4x11 - Cabin Fever.AVI")).unwrap();
        File::create(dir.join("Lost - 4x12 - There's No Place Like Home.mkv")).unwrap();
        fs::create_dir(dir.join("Lost - 4x13 - folder.mkv")).unwrap();

        let library = LocalLibrary;
        assert_eq!(
            library.find_match(dir, "* - 4x11 - *.avi").unwrap(),
            Some(dir.join("Lost - 4x11 - Cabin Fever.AVI"))
        );
        assert_eq!(library.find_match(dir, "* - 4x11 - *.mkv").unwrap(), None);
        assert_eq!(library.find_match(dir, "* - 4x13 - *.mkv").unwrap(), None);
    }

    #[test]
    fn test_find_match_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = LocalLibrary
            .find_match(&temp_dir.path().join("Season 9"), "*.mkv")
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_nzb_archive() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("Lost - 4x11 - Cabin Fever.nzb.gz")).unwrap();

        let archive = NzbArchiveDir::new(Some(temp_dir.path().to_path_buf()));
        assert!(archive.contains("Lost - 4x11 - Cabin Fever").unwrap());
        assert!(!archive.contains("Lost - 4x12 - Something").unwrap());

        let disabled = NzbArchiveDir::new(None);
        assert!(!disabled.contains("Lost - 4x11 - Cabin Fever").unwrap());
    }
}
