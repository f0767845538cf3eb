//! Output formatting for analysis results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::analysis::Context;
use crate::scan::{AnalysisReport, FileError, Summary};

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub root: String,
    /// `complete`, `incomplete` (some files failed) or `cancelled`.
    pub status: String,
    pub summary: Summary,
    pub files: Vec<JsonFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_undocumented: Vec<JsonTopEntry>,
}

/// One analysed file.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFile {
    pub path: String,
    pub language: String,
    pub declarations: usize,
    pub documented: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
    pub undocumented: Vec<Context>,
}

/// Entry in the largest-undocumented ranking.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonTopEntry {
    pub file: String,
    pub line: usize,
    pub kind: String,
    pub name: String,
    /// Line span, 1 when the extent is unknown.
    pub lines: usize,
}

/// Overall outcome of a run, as shown to users.
pub fn run_status(report: &AnalysisReport) -> &'static str {
    if report.cancelled {
        "cancelled"
    } else if report.summary.files_failed > 0 {
        "incomplete"
    } else {
        "complete"
    }
}

/// Build the JSON report structure.
pub fn build_json_report(report: &AnalysisReport, top: usize) -> JsonReport {
    let files = report
        .files
        .iter()
        .map(|f| JsonFile {
            path: f.path.clone(),
            language: f.language.clone(),
            declarations: f.findings.len(),
            documented: f.documented_count(),
            error: f.error.clone(),
            undocumented: f.undocumented().cloned().collect(),
        })
        .collect();

    let top_undocumented = report
        .top_undocumented(top)
        .into_iter()
        .map(|(file, finding)| JsonTopEntry {
            file: file.path.clone(),
            line: finding.candidate.line(),
            kind: finding.candidate.kind.to_string(),
            name: finding.candidate.qualified_name(),
            lines: finding.span(),
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        root: report.root.to_string_lossy().to_string(),
        status: run_status(report).to_string(),
        summary: report.summary.clone(),
        files,
        top_undocumented,
    }
}

/// Write results in JSON format.
pub fn write_json(report: &AnalysisReport, top: usize) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json_report(report, top))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(report: &AnalysisReport, top: usize) {
    // Header
    println!();
    print!("  ");
    print!("{}", "docgap".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", report.root.display());
    println!();

    write_counts(&report.summary);
    println!();

    if !report.summary.languages.is_empty() {
        write_languages(&report.summary);
        println!();
    }

    if report.has_undocumented() {
        write_undocumented(report);
        println!();
    }

    if top > 0 && report.has_undocumented() {
        write_top(report, top);
        println!();
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("  {} ({}):", "Not analysed".yellow(), failures.len());
        for (file, err) in failures {
            println!("    {}  {}", file.path.blue(), err.to_string().dimmed());
        }
        println!();
    }

    write_final_status(report);
    println!();
}

fn write_counts(summary: &Summary) {
    println!(
        "  Files:        {} scanned, {} skipped, {} failed",
        summary.files_scanned, summary.files_skipped, summary.files_failed
    );
    print!(
        "  Declarations: {} found, {} documented, {} undocumented",
        summary.declarations_found,
        summary.declarations_documented,
        summary.declarations_undocumented
    );
    if let Some(pct) = coverage_percent(summary) {
        print!("  ");
        write_colored_coverage(pct);
    }
    println!();
}

/// Documented share of declarations, `None` when nothing was found.
pub fn coverage_percent(summary: &Summary) -> Option<f64> {
    if summary.declarations_found == 0 {
        return None;
    }
    Some(summary.declarations_documented as f64 * 100.0 / summary.declarations_found as f64)
}

fn write_colored_coverage(pct: f64) {
    let text = format!("({:.1}% documented)", pct);
    match pct {
        p if p >= 90.0 => print!("{}", text.green().bold()),
        p if p >= 75.0 => print!("{}", text.green()),
        p if p >= 50.0 => print!("{}", text.yellow()),
        _ => print!("{}", text.red()),
    }
}

fn write_languages(summary: &Summary) {
    println!("  {}", "By language:".bold());
    for (language, stats) in &summary.languages {
        println!(
            "    {:<12} {:>5} files {:>7} declarations {:>7} undocumented",
            language, stats.files, stats.declarations, stats.undocumented
        );
    }
}

fn write_undocumented(report: &AnalysisReport) {
    println!(
        "  {} ({}):",
        "Undocumented".bold(),
        report.summary.declarations_undocumented
    );
    println!();
    for (file, ctx) in report.undocumented() {
        print!("    {:<8} ", ctx.kind.as_str().dimmed());
        print!("{}", file.path.blue());
        print!("{}", format!(":{}", ctx.line).dimmed());
        print!("  ");
        match &ctx.enclosing_scope {
            Some(scope) => println!("{}.{}", scope.dimmed(), ctx.name),
            None => println!("{}", ctx.name),
        }
    }
}

fn write_top(report: &AnalysisReport, top: usize) {
    println!("  {}", format!("Largest undocumented (top {}):", top).bold());
    for (file, finding) in report.top_undocumented(top) {
        println!(
            "    {:>5} lines  {}{}  {}",
            finding.span(),
            file.path.blue(),
            format!(":{}", finding.candidate.line()).dimmed(),
            finding.candidate.qualified_name()
        );
    }
}

fn write_final_status(report: &AnalysisReport) {
    let summary = &report.summary;
    if report.cancelled {
        print!("  {}", "CANCELLED".yellow());
        print!("  {}", "results cover only the files analysed before cancellation".dimmed());
    } else if summary.files_scanned == 0 && summary.files_failed > 0 {
        print!("  {}", "✗ FAILED".red());
        print!("  no file could be analysed");
    } else if report.has_undocumented() {
        print!("  {}", "✗ UNDOCUMENTED".red());
        print!("  {} declarations need docs", summary.declarations_undocumented);
    } else if summary.files_scanned == 0 {
        print!("  {}", "✓ NOTHING TO CHECK".green());
        print!("  no supported source files found");
    } else {
        print!("  {}", "✓ DOCUMENTED".green());
        print!("  every declaration has a doc comment");
    }
    if !report.cancelled && summary.files_failed > 0 && summary.files_scanned > 0 {
        print!("  {}", format!("({} files not analysed)", summary.files_failed).yellow());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::profiles::{PYTHON, RUST};
    use crate::scan::{analyze_source, AnalysisOptions, FileReport};

    fn sample() -> AnalysisReport {
        let mut report = AnalysisReport::new("/project");
        let mut py = FileReport::new("app.py", "python");
        py.findings = analyze_source(
            "def documented():\n    \"\"\"Doc.\"\"\"\n\ndef bare(x):\n    return x\n",
            &PYTHON,
            &AnalysisOptions::default(),
        );
        report.push(py);
        let mut rs = FileReport::new("lib.rs", "rust");
        rs.findings = analyze_source(
            "pub fn long() {\n    a();\n    b();\n    c();\n}\n",
            &RUST,
            &AnalysisOptions::default(),
        );
        report.push(rs);
        report.push(FileReport::failed("blob.c", "c", FileError::Binary));
        report
    }

    #[test]
    fn test_json_report_structure() {
        let json = build_json_report(&sample(), 1);
        assert_eq!(json.status, "incomplete");
        assert_eq!(json.files.len(), 3);
        assert_eq!(json.files[0].declarations, 2);
        assert_eq!(json.files[0].documented, 1);
        assert_eq!(json.files[0].undocumented[0].name, "bare");
        assert_eq!(json.files[2].error, Some(FileError::Binary));
        assert_eq!(json.top_undocumented.len(), 1);
        assert_eq!(json.top_undocumented[0].name, "long");
        assert_eq!(json.top_undocumented[0].lines, 5);
    }

    #[test]
    fn test_json_round_trips_through_serde() {
        let json = serde_json::to_string(&build_json_report(&sample(), 0)).unwrap();
        let parsed: JsonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.summary.declarations_undocumented, 2);
        assert!(parsed.top_undocumented.is_empty());
        assert!(json.contains("\"kind\":\"binary\""));
    }

    #[test]
    fn test_status_distinguishes_outcomes() {
        let mut report = AnalysisReport::new("/empty");
        assert_eq!(run_status(&report), "complete");
        report.push(FileReport::failed("x.py", "python", FileError::Binary));
        assert_eq!(run_status(&report), "incomplete");
        report.cancelled = true;
        assert_eq!(run_status(&report), "cancelled");
    }

    #[test]
    fn test_coverage_percent() {
        let report = sample();
        let pct = coverage_percent(&report.summary).unwrap();
        assert!((pct - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(coverage_percent(&Summary::default()), None);
    }
}
