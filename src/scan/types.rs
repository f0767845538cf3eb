//! Records produced by an analysis run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::analysis::{Context, DeclarationCandidate};

/// Why a file could not be analysed. Recorded on the file's report; never
/// aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileError {
    #[error("unreadable: {message}")]
    Unreadable { message: String },
    #[error("cannot decode as {encoding}: {message}")]
    Decode { encoding: String, message: String },
    #[error("binary content")]
    Binary,
    #[error("file too large ({size} bytes, limit {limit})")]
    TooLarge { size: u64, limit: u64 },
}

/// One declaration and its documentation status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFinding {
    pub candidate: DeclarationCandidate,
    pub has_documentation: bool,
    /// Present only for undocumented declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

impl AnalysisFinding {
    /// Number of lines the declaration spans, or 1 when its end is unknown.
    pub fn span(&self) -> usize {
        self.candidate
            .end_line
            .map(|end| end - self.candidate.start_line + 1)
            .unwrap_or(1)
    }
}

/// Findings for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Path relative to the analysed root, with `/` separators.
    pub path: String,
    pub language: String,
    pub findings: Vec<AnalysisFinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
}

impl FileReport {
    pub fn new(path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            findings: Vec::new(),
            error: None,
        }
    }

    /// A report for a file that failed before scanning.
    pub fn failed(path: impl Into<String>, language: impl Into<String>, error: FileError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(path, language)
        }
    }

    /// Contexts of undocumented declarations, in discovery order.
    pub fn undocumented(&self) -> impl Iterator<Item = &Context> {
        self.findings.iter().filter_map(|f| f.context.as_ref())
    }

    pub fn undocumented_count(&self) -> usize {
        self.findings.iter().filter(|f| !f.has_documentation).count()
    }

    pub fn documented_count(&self) -> usize {
        self.findings.iter().filter(|f| f.has_documentation).count()
    }
}

/// Per-language counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub files: usize,
    pub declarations: usize,
    pub undocumented: usize,
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub files_scanned: usize,
    /// Files with no registered language, or excluded by the allowlist.
    pub files_skipped: usize,
    pub files_failed: usize,
    pub declarations_found: usize,
    pub declarations_documented: usize,
    pub declarations_undocumented: usize,
    pub languages: BTreeMap<String, LanguageStats>,
}

/// Result of analysing one directory tree.
///
/// Built as an accumulator: the orchestrator pushes file reports in path
/// order and the summary is updated as they arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub root: PathBuf,
    pub files: Vec<FileReport>,
    pub summary: Summary,
    /// The run was cancelled before every file was analysed.
    #[serde(default)]
    pub cancelled: bool,
}

impl AnalysisReport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Add a file report and update the counters.
    pub fn push(&mut self, file: FileReport) {
        let summary = &mut self.summary;
        let stats = summary.languages.entry(file.language.clone()).or_default();
        stats.files += 1;
        if file.error.is_some() {
            summary.files_failed += 1;
        } else {
            summary.files_scanned += 1;
        }
        let documented = file.documented_count();
        let undocumented = file.undocumented_count();
        stats.declarations += documented + undocumented;
        stats.undocumented += undocumented;
        summary.declarations_found += documented + undocumented;
        summary.declarations_documented += documented;
        summary.declarations_undocumented += undocumented;
        self.files.push(file);
    }

    /// Count a file that was not analysed (unknown language or not allowed).
    pub fn record_skipped(&mut self) {
        self.summary.files_skipped += 1;
    }

    /// Every undocumented declaration, in file order then discovery order.
    pub fn undocumented(&self) -> impl Iterator<Item = (&FileReport, &Context)> {
        self.files
            .iter()
            .flat_map(|file| file.undocumented().map(move |ctx| (file, ctx)))
    }

    /// The `n` largest undocumented declarations by line span. Ties keep
    /// report order.
    pub fn top_undocumented(&self, n: usize) -> Vec<(&FileReport, &AnalysisFinding)> {
        let mut all: Vec<_> = self
            .files
            .iter()
            .flat_map(|file| {
                file.findings
                    .iter()
                    .filter(|f| !f.has_documentation)
                    .map(move |f| (file, f))
            })
            .collect();
        all.sort_by(|a, b| b.1.span().cmp(&a.1.span()));
        all.truncate(n);
        all
    }

    /// Files that recorded an error.
    pub fn failures(&self) -> impl Iterator<Item = (&FileReport, &FileError)> {
        self.files
            .iter()
            .filter_map(|f| f.error.as_ref().map(|e| (f, e)))
    }

    /// Whether any undocumented declaration was found.
    pub fn has_undocumented(&self) -> bool {
        self.summary.declarations_undocumented > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DeclarationKind, ParamList};

    fn finding(name: &str, start: usize, end: Option<usize>, documented: bool) -> AnalysisFinding {
        let candidate = DeclarationCandidate {
            kind: DeclarationKind::Function,
            name: name.to_string(),
            language: "go".to_string(),
            start_line: start,
            header_end: start,
            end_line: end,
            signature: format!("func {}()", name),
            body_column: None,
            body_inline: false,
            nesting_path: Vec::new(),
            preceding: Vec::new(),
            attributes_start: start,
        };
        let context = (!documented).then(|| Context {
            kind: DeclarationKind::Function,
            name: name.to_string(),
            language: "go".to_string(),
            line: start + 1,
            signature: candidate.signature.clone(),
            params: ParamList::default(),
            return_hint: None,
            enclosing_scope: None,
            nesting_depth: 0,
            body: Vec::new(),
            body_truncated: false,
        });
        AnalysisFinding {
            candidate,
            has_documentation: documented,
            context,
        }
    }

    fn sample() -> AnalysisReport {
        let mut report = AnalysisReport::new("/tmp/project");
        let mut a = FileReport::new("a.go", "go");
        a.findings.push(finding("small", 0, Some(1), false));
        a.findings.push(finding("doc", 3, Some(9), true));
        a.findings.push(finding("big", 10, Some(30), false));
        report.push(a);
        let mut b = FileReport::new("b.go", "go");
        b.findings.push(finding("unknown_end", 0, None, false));
        b.findings.push(finding("medium", 2, Some(6), false));
        report.push(b);
        report.push(FileReport::failed("c.go", "go", FileError::Binary));
        report.record_skipped();
        report
    }

    #[test]
    fn test_summary_counts() {
        let report = sample();
        let s = &report.summary;
        assert_eq!(s.files_scanned, 2);
        assert_eq!(s.files_failed, 1);
        assert_eq!(s.files_skipped, 1);
        assert_eq!(s.declarations_found, 5);
        assert_eq!(s.declarations_documented, 1);
        assert_eq!(s.declarations_undocumented, 4);
        assert_eq!(
            s.languages.get("go"),
            Some(&LanguageStats {
                files: 3,
                declarations: 5,
                undocumented: 4
            })
        );
        assert!(report.has_undocumented());
    }

    #[test]
    fn test_undocumented_order() {
        let report = sample();
        let names: Vec<_> = report
            .undocumented()
            .map(|(f, ctx)| format!("{}:{}", f.path, ctx.name))
            .collect();
        assert_eq!(names, ["a.go:small", "a.go:big", "b.go:unknown_end", "b.go:medium"]);
    }

    #[test]
    fn test_top_undocumented_by_span() {
        let report = sample();
        let top: Vec<_> = report
            .top_undocumented(3)
            .into_iter()
            .map(|(_, f)| f.candidate.name.as_str())
            .collect();
        assert_eq!(top, ["big", "medium", "small"]);
        assert_eq!(report.top_undocumented(100).len(), 4);
    }

    #[test]
    fn test_file_error_serialization() {
        let json = serde_json::to_string(&FileError::TooLarge { size: 10, limit: 5 }).unwrap();
        assert_eq!(json, r#"{"kind":"too_large","size":10,"limit":5}"#);
        let json = serde_json::to_string(&FileError::Binary).unwrap();
        assert_eq!(json, r#"{"kind":"binary"}"#);
    }

    #[test]
    fn test_empty_report() {
        let report = AnalysisReport::new("/empty");
        assert_eq!(report.summary, Summary::default());
        assert!(!report.has_undocumented());
        assert_eq!(report.undocumented().count(), 0);
        assert!(report.failures().next().is_none());
    }
}
