//! Source file discovery
//!
//! Walks the project tree honoring .gitignore, keeps only Kotlin and Java
//! sources, and applies the exclude patterns from the configuration.

use crate::config::Config;
use ignore::WalkBuilder;
use regex::RegexSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid exclude pattern in configuration: {0}")]
    Pattern(#[from] regex::Error),
    #[error("failed to walk {dir}: {source}")]
    Walk {
        dir: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// Supported source languages by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Kotlin,
    Java,
}

impl FileType {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "kt" | "kts" => Some(FileType::Kotlin),
            "java" => Some(FileType::Java),
            _ => None,
        }
    }
}

/// A discovered source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_type: FileType,
}

/// Discovers analyzable files under a project root
#[derive(Debug)]
pub struct FileFinder {
    excludes: RegexSet,
    targets: Vec<PathBuf>,
}

impl FileFinder {
    pub fn new(config: &Config) -> Result<Self, DiscoveryError> {
        let excludes = RegexSet::new(&config.exclude)?;
        Ok(Self {
            excludes,
            targets: config.targets.clone(),
        })
    }

    /// Find all Kotlin/Java files under `root` (or under the configured
    /// target directories, when set)
    pub fn find_files(&self, root: &Path) -> Result<Vec<SourceFile>, DiscoveryError> {
        let roots: Vec<PathBuf> = if self.targets.is_empty() {
            vec![root.to_path_buf()]
        } else {
            self.targets
                .iter()
                .map(|t| if t.is_absolute() { t.clone() } else { root.join(t) })
                .collect()
        };

        let mut files = Vec::new();
        for dir in roots {
            let walker = WalkBuilder::new(&dir)
                .hidden(true)
                .git_ignore(true)
                .build();
            for entry in walker {
                let entry = entry.map_err(|source| DiscoveryError::Walk {
                    dir: dir.clone(),
                    source,
                })?;
                let path = entry.path();
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let Some(file_type) = FileType::from_path(path) else {
                    continue;
                };
                if self.is_excluded(path) {
                    debug!(path = %path.display(), "excluded by pattern");
                    continue;
                }
                files.push(SourceFile {
                    path: path.to_path_buf(),
                    file_type,
                });
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
        debug!(count = files.len(), "discovered source files");
        Ok(files)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let display = path.to_string_lossy();
        !self.excludes.is_empty() && self.excludes.is_match(&display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, rel: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_file_type_from_path() {
        assert_eq!(
            FileType::from_path(Path::new("A.kt")),
            Some(FileType::Kotlin)
        );
        assert_eq!(
            FileType::from_path(Path::new("b/B.java")),
            Some(FileType::Java)
        );
        assert_eq!(FileType::from_path(Path::new("c.xml")), None);
        assert_eq!(FileType::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_finds_kotlin_and_java() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/Main.kt");
        touch(&dir, "src/Repo.java");
        touch(&dir, "res/layout.xml");

        let finder = FileFinder::new(&Config::default()).unwrap();
        let files = finder.find_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_invalid_exclude_pattern_is_an_error() {
        let config = Config {
            exclude: vec!["[unclosed".to_string()],
            ..Default::default()
        };
        let err = FileFinder::new(&config).unwrap_err();
        assert!(matches!(err, DiscoveryError::Pattern(_)));
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/Main.kt");
        touch(&dir, "build/generated/Gen.kt");

        let config = Config {
            exclude: vec!["build/".to_string()],
            ..Default::default()
        };
        let finder = FileFinder::new(&config).unwrap();
        let files = finder.find_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("src/Main.kt"));
    }
}
