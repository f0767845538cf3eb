//! Analysis orchestrator.
//!
//! The [`Runner`] validates its configuration, walks the root, and runs the
//! scan → classify → extract pipeline on every file in a rayon pool. Files
//! are independent: each worker owns its file's records until it returns a
//! [`FileReport`], and per-file failures are recorded on that report rather
//! than returned as errors.

use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::{AnalysisFinding, AnalysisReport, FileError, FileReport};
use super::walk::{collect_files, IgnoreMatcher, WalkedFile};
use crate::analysis::{
    extract, has_documentation, profiles, scan, LanguageProfile, DEFAULT_LOOKBACK,
    DEFAULT_MAX_BODY_LINES,
};
use crate::error::{Error, Result};

/// Bytes inspected when looking for binary content.
const BINARY_SNIFF_LEN: usize = 8 * 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Text encoding used to decode source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl Encoding {
    /// Parse an encoding label (`utf-8`, `latin-1` and common aliases).
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Some(Encoding::Latin1),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
        }
    }

    /// Decode file bytes. A UTF-8 byte order mark is dropped.
    pub fn decode(&self, bytes: &[u8]) -> std::result::Result<String, FileError> {
        match self {
            Encoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8(bytes.to_vec()).map_err(|e| FileError::Decode {
                    encoding: self.as_str().to_string(),
                    message: e.to_string(),
                })
            }
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Encode text for writing back. Latin-1 fails on characters above U+00FF.
    pub fn encode(&self, text: &str) -> Option<Vec<u8>> {
        match self {
            Encoding::Utf8 => Some(text.as_bytes().to_vec()),
            Encoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).ok())
                .collect(),
        }
    }
}

/// Per-file analysis settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Blank/attribute lines tolerated above a declaration.
    pub doc_lookback: usize,
    /// Body lines copied into each context.
    pub max_body_lines: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            doc_lookback: DEFAULT_LOOKBACK,
            max_body_lines: DEFAULT_MAX_BODY_LINES,
        }
    }
}

/// Run scanner, classifier and extractor over one file's text.
///
/// Only undocumented findings carry a context.
pub fn analyze_source(
    source: &str,
    profile: &'static LanguageProfile,
    options: &AnalysisOptions,
) -> Vec<AnalysisFinding> {
    let lines: Vec<&str> = source.lines().collect();
    scan(source, profile)
        .map(|candidate| {
            let documented = has_documentation(&candidate, &lines, profile, options.doc_lookback);
            let context = if documented {
                None
            } else {
                Some(extract(&candidate, &lines, profile, options.max_body_lines))
            };
            AnalysisFinding {
                candidate,
                has_documentation: documented,
                context,
            }
        })
        .collect()
}

/// Analyse a tree with default settings.
///
/// `language_allowlist` holds language ids or extensions; an empty list
/// allows every registered language.
pub fn analyze<P: AsRef<Path>>(
    root: P,
    ignore_patterns: &[String],
    language_allowlist: &[String],
) -> Result<AnalysisReport> {
    Runner::new(root)
        .ignore_patterns(ignore_patterns.to_vec())
        .languages(language_allowlist.to_vec())
        .run()
}

/// Configures and executes an analysis run.
pub struct Runner {
    root: PathBuf,
    ignore_patterns: Vec<String>,
    languages: Vec<String>,
    jobs: Option<usize>,
    encoding: String,
    max_file_size: Option<u64>,
    options: AnalysisOptions,
    follow_links: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl Runner {
    /// Create a runner for the given root directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ignore_patterns: Vec::new(),
            languages: Vec::new(),
            jobs: None,
            encoding: Encoding::Utf8.as_str().to_string(),
            max_file_size: None,
            options: AnalysisOptions::default(),
            follow_links: false,
            cancel: None,
        }
    }

    /// Glob patterns for paths to skip.
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Restrict analysis to these language ids or extensions.
    pub fn languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    /// Worker pool size. `None` uses the available parallelism.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Files larger than this many bytes are recorded as errors.
    pub fn max_file_size(mut self, bytes: Option<u64>) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn max_body_lines(mut self, lines: usize) -> Self {
        self.options.max_body_lines = lines;
        self
    }

    pub fn doc_lookback(mut self, lines: usize) -> Self {
        self.options.doc_lookback = lines;
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Flag checked before each file; setting it stops the run between files.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Resolve the allowlist to language ids. Empty means everything.
    fn allowed_languages(&self) -> Result<Option<HashSet<&'static str>>> {
        if self.languages.is_empty() {
            return Ok(None);
        }
        self.languages
            .iter()
            .map(|entry| {
                profiles::lookup(entry)
                    .map(|p| p.id)
                    .ok_or_else(|| Error::UnknownLanguage(entry.clone()))
            })
            .collect::<Result<HashSet<_>>>()
            .map(Some)
    }

    /// Run the analysis.
    ///
    /// Configuration problems and an unusable root are errors, reported
    /// before any file is read. Everything that goes wrong inside a file is
    /// recorded on that file's report.
    pub fn run(&self) -> Result<AnalysisReport> {
        let ignore = IgnoreMatcher::new(&self.ignore_patterns)?;
        let allowed = self.allowed_languages()?;
        let encoding = Encoding::parse(&self.encoding)
            .ok_or_else(|| Error::UnsupportedEncoding(self.encoding.clone()))?;
        if !self.root.exists() {
            return Err(Error::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(Error::RootNotDirectory(self.root.clone()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()?;

        let mut report = AnalysisReport::new(&self.root);
        let mut tasks = Vec::new();
        for file in collect_files(&self.root, &ignore, self.follow_links)? {
            let profile = profiles::resolve(&file.path)
                .filter(|p| allowed.as_ref().map(|set| set.contains(p.id)).unwrap_or(true));
            match profile {
                Some(profile) => tasks.push((file, profile)),
                None => report.record_skipped(),
            }
        }
        debug!(files = tasks.len(), root = %self.root.display(), "starting analysis");

        let results: Vec<Option<FileReport>> = pool.install(|| {
            tasks
                .par_iter()
                .map(|(file, profile)| {
                    if self.is_cancelled() {
                        return None;
                    }
                    Some(self.analyze_file(file, profile, encoding))
                })
                .collect()
        });

        let mut files: Vec<FileReport> = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Some(file) => files.push(file),
                None => report.cancelled = true,
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        for file in files {
            report.push(file);
        }

        info!(
            scanned = report.summary.files_scanned,
            skipped = report.summary.files_skipped,
            failed = report.summary.files_failed,
            undocumented = report.summary.declarations_undocumented,
            cancelled = report.cancelled,
            "analysis complete"
        );
        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    fn analyze_file(
        &self,
        file: &WalkedFile,
        profile: &'static LanguageProfile,
        encoding: Encoding,
    ) -> FileReport {
        debug!(path = %file.relative, language = profile.id, "analysing file");
        match self.read_source(&file.path, encoding) {
            Ok(source) => {
                let mut report = FileReport::new(&file.relative, profile.id);
                report.findings = analyze_source(&source, profile, &self.options);
                report
            }
            Err(err) => {
                warn!(path = %file.relative, error = %err, "file not analysed");
                FileReport::failed(&file.relative, profile.id, err)
            }
        }
    }

    fn read_source(
        &self,
        path: &Path,
        encoding: Encoding,
    ) -> std::result::Result<String, FileError> {
        let unreadable = |e: std::io::Error| FileError::Unreadable {
            message: e.to_string(),
        };
        if let Some(limit) = self.max_file_size {
            let size = fs::metadata(path).map_err(unreadable)?.len();
            if size > limit {
                return Err(FileError::TooLarge { size, limit });
            }
        }
        let bytes = fs::read(path).map_err(unreadable)?;
        if bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0) {
            return Err(FileError::Binary);
        }
        encoding.decode(&bytes)
    }
}
