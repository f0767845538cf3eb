//! Edit planning and application.
//!
//! [`plan_edits`] turns an [`AnalysisReport`] into per-file insertions of
//! generated doc comments. [`apply_edits`] splices them into source text,
//! [`render_diff`] shows them as a dry run, and a [`Publisher`] delivers the
//! result somewhere. [`LocalWriter`] rewrites files in place.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analysis::profiles::{self, DocPlacement};
use crate::error::{Error, Result};
use crate::generate::CommentGenerator;
use crate::scan::{AnalysisFinding, AnalysisReport, Encoding};

/// Indentation added below a header whose body indentation is unknown.
const DEFAULT_BODY_INDENT: &str = "    ";

/// One insertion of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// 0-based line the text is inserted before, in original numbering.
    pub line: usize,
    /// Unindented comment text.
    pub text: String,
    /// Where the comment sits relative to its declaration; decides which
    /// line the indentation is copied from.
    pub placement: DocPlacement,
    /// Name of the documented declaration, for messages.
    pub symbol: String,
}

/// All edits for one file, ordered by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdits {
    /// Root-relative path, as in the report.
    pub path: String,
    pub language: String,
    pub edits: Vec<Edit>,
}

/// Outcome of publishing a set of changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishHandle {
    pub files_changed: Vec<PathBuf>,
    pub comments_inserted: usize,
}

/// Delivers planned edits (local rewrite, a branch, a pull request...).
pub trait Publisher {
    fn apply_patch_and_publish(&self, changes: &[FileEdits]) -> Result<PublishHandle>;
}

/// Plan one insertion per undocumented declaration.
///
/// Preceding-style comments go above the declaration and above any
/// attribute lines directly on top of it. Docstrings go on the line after
/// the header. One-line definitions whose body shares the header line are
/// skipped, as are files that failed to analyse.
pub fn plan_edits(report: &AnalysisReport, generator: &dyn CommentGenerator) -> Vec<FileEdits> {
    let mut planned = Vec::new();
    for file in report.files.iter().filter(|f| f.error.is_none()) {
        let Some(profile) = profiles::by_id(&file.language) else {
            continue;
        };
        let mut edits: Vec<Edit> = file
            .findings
            .iter()
            .filter_map(|finding| {
                let context = finding.context.as_ref()?;
                let line = insertion_line(finding, profile.doc_placement)?;
                Some(Edit {
                    line,
                    text: generator.generate_comment(context),
                    placement: profile.doc_placement,
                    symbol: finding.candidate.qualified_name(),
                })
            })
            .collect();
        if edits.is_empty() {
            continue;
        }
        edits.sort_by_key(|e| e.line);
        planned.push(FileEdits {
            path: file.path.clone(),
            language: file.language.clone(),
            edits,
        });
    }
    planned
}

fn insertion_line(finding: &AnalysisFinding, placement: DocPlacement) -> Option<usize> {
    let candidate = &finding.candidate;
    match placement {
        DocPlacement::FirstInside => {
            (!candidate.body_inline).then_some(candidate.header_end + 1)
        }
        DocPlacement::Preceding => Some(candidate.attributes_start.min(candidate.start_line)),
    }
}

/// Insert the edits into `source` and return the new text.
///
/// Line numbers refer to the original text. Every inserted line gets the
/// indentation of the declaration (preceding comments) or of the body
/// (docstrings). Line endings follow the source and a trailing newline is
/// kept only if the source had one.
pub fn apply_edits(source: &str, edits: &[Edit]) -> String {
    let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let lines: Vec<&str> = source.lines().collect();

    let mut by_line: BTreeMap<usize, Vec<&Edit>> = BTreeMap::new();
    for edit in edits {
        by_line.entry(edit.line.min(lines.len())).or_default().push(edit);
    }

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + edits.len() * 4);
    for idx in 0..=lines.len() {
        if let Some(pending) = by_line.get(&idx) {
            for edit in pending {
                let indent = edit_indent(&lines, edit);
                out.extend(indent_text(&edit.text, &indent));
            }
        }
        if let Some(line) = lines.get(idx) {
            out.push(line.to_string());
        }
    }

    let mut text = out.join(newline);
    if source.ends_with('\n') || (source.is_empty() && !text.is_empty()) {
        text.push_str(newline);
    }
    text
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn edit_indent(lines: &[&str], edit: &Edit) -> String {
    match edit.placement {
        DocPlacement::Preceding => lines
            .get(edit.line)
            .map(|l| leading_whitespace(l).to_string())
            .unwrap_or_default(),
        DocPlacement::FirstInside => {
            let header = edit
                .line
                .checked_sub(1)
                .and_then(|i| lines.get(i))
                .map(|l| leading_whitespace(l))
                .unwrap_or("");
            let body = lines
                .iter()
                .skip(edit.line)
                .find(|l| !l.trim().is_empty())
                .map(|l| leading_whitespace(l))
                .filter(|b| b.len() > header.len());
            match body {
                Some(b) => b.to_string(),
                None => format!("{}{}", header, DEFAULT_BODY_INDENT),
            }
        }
    }
}

fn indent_text(text: &str, indent: &str) -> Vec<String> {
    text.lines()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, l)
            }
        })
        .collect()
}

/// Render the edits for one file as a zero-context unified diff.
pub fn render_diff(file: &FileEdits, source: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let mut out = format!("--- a/{}\n+++ b/{}\n", file.path, file.path);
    let mut offset = 0;
    for edit in &file.edits {
        let at = edit.line.min(lines.len());
        let added = indent_text(&edit.text, &edit_indent(&lines, edit));
        out.push_str(&format!(
            "@@ -{},0 +{},{} @@ {}\n",
            at,
            at + offset + 1,
            added.len(),
            edit.symbol
        ));
        for line in &added {
            out.push('+');
            out.push_str(line);
            out.push('\n');
        }
        offset += added.len();
    }
    out
}

/// Rewrites files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalWriter {
    root: PathBuf,
    encoding: Encoding,
}

impl LocalWriter {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            encoding: Encoding::Utf8,
        }
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn patch_file(&self, change: &FileEdits) -> Result<PathBuf> {
        let path = self.root.join(&change.path);
        let bytes = fs::read(&path)?;
        let source = self.encoding.decode(&bytes).map_err(|e| Error::Patch {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let patched = apply_edits(&source, &change.edits);
        let mut out = Vec::with_capacity(patched.len() + 3);
        if self.encoding == Encoding::Utf8 && bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
        }
        let encoded = self.encoding.encode(&patched).ok_or_else(|| Error::Patch {
            path: path.clone(),
            message: format!("generated text is not representable in {}", self.encoding.as_str()),
        })?;
        out.extend(encoded);
        fs::write(&path, out)?;
        debug!(path = %change.path, edits = change.edits.len(), "patched file");
        Ok(path)
    }
}

impl Publisher for LocalWriter {
    fn apply_patch_and_publish(&self, changes: &[FileEdits]) -> Result<PublishHandle> {
        let mut handle = PublishHandle::default();
        for change in changes.iter().filter(|c| !c.edits.is_empty()) {
            handle.files_changed.push(self.patch_file(change)?);
            handle.comments_inserted += change.edits.len();
        }
        info!(
            files = handle.files_changed.len(),
            comments = handle.comments_inserted,
            "wrote doc comments"
        );
        Ok(handle)
    }
}
