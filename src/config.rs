//! Configuration file schema and discovery.
//!
//! A configuration file sets analysis defaults for a project. Lookup order:
//! an explicit path, `docgap.yaml` / `.docgap.yaml` in the working
//! directory, then `config.yaml` in the user's config directory. Without a
//! file the built-in defaults apply.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::profiles;
use crate::error::{Error, Result};
use crate::scan::{Encoding, IgnoreMatcher, Runner};

/// Config file names searched in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["docgap.yaml", ".docgap.yaml"];

/// Commented template written by `docgap init`.
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/default.yaml");

/// Directories that are never worth scanning.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "**/.git/**",
    "**/node_modules/**",
    "**/venv/**",
    "**/env/**",
    "**/__pycache__/**",
    "**/target/**",
    "**/build/**",
    "**/dist/**",
];

const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;
const DEFAULT_TOP: usize = 10;

/// Analysis settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Glob patterns for paths to exclude from analysis.
    pub ignore_patterns: Vec<String>,
    /// Language ids or extensions to analyse; empty means all.
    pub languages: Vec<String>,
    pub encoding: String,
    pub max_body_lines: usize,
    pub doc_lookback: usize,
    pub max_file_size: Option<u64>,
    pub jobs: Option<usize>,
    pub follow_links: bool,
    /// Size of the largest-undocumented ranking.
    pub top: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_patterns: DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            languages: Vec::new(),
            encoding: Encoding::Utf8.as_str().to_string(),
            max_body_lines: crate::analysis::DEFAULT_MAX_BODY_LINES,
            doc_lookback: crate::analysis::DEFAULT_LOOKBACK,
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
            jobs: None,
            follow_links: false,
            top: DEFAULT_TOP,
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse a configuration from YAML text. An empty document yields the
    /// defaults.
    pub fn parse_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Option<Config> = serde_yaml::from_str(content)?;
        Ok(config.unwrap_or_default())
    }

    /// Load from `explicit`, or from the first discovered file, or defaults.
    ///
    /// Returns the path the configuration came from, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover_in(Path::new(".")).or_else(user_config_path),
        };
        match path {
            Some(p) => {
                let config = Self::parse_file(&p)?;
                config.validate()?;
                Ok((config, Some(p)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Check every setting without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        IgnoreMatcher::new(&self.ignore_patterns)?;
        for entry in &self.languages {
            if profiles::lookup(entry).is_none() {
                return Err(Error::UnknownLanguage(entry.clone()));
            }
        }
        if Encoding::parse(&self.encoding).is_none() {
            return Err(Error::UnsupportedEncoding(self.encoding.clone()));
        }
        if self.jobs == Some(0) {
            return Err(Error::Config("jobs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// A runner for `root` with these settings.
    pub fn runner<P: AsRef<Path>>(&self, root: P) -> Runner {
        Runner::new(root)
            .ignore_patterns(self.ignore_patterns.clone())
            .languages(self.languages.clone())
            .encoding(self.encoding.clone())
            .max_body_lines(self.max_body_lines)
            .doc_lookback(self.doc_lookback)
            .max_file_size(self.max_file_size)
            .jobs(self.jobs)
            .follow_links(self.follow_links)
    }
}

/// First default-named config file in `dir`.
pub fn discover_in(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// `config.yaml` in the user's config directory, if it exists.
pub fn user_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "docgap")?;
    let path = dirs.config_dir().join("config.yaml");
    path.is_file().then_some(path)
}
