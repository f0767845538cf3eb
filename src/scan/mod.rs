//! Tree-level analysis.
//!
//! Walks a root directory, resolves a language profile for every file and
//! runs the per-file pipeline from [`crate::analysis`] on a rayon pool.
//!
//! ```text
//! root ──▶ walk (ignore, sort) ──▶ resolve profile ──▶ par_iter(analyze file)
//!                                        │                     │
//!                                   skipped count         FileReport (path order)
//!                                                              │
//!                                                        AnalysisReport
//! ```

mod runner;
mod types;
mod walk;

pub use runner::{analyze, analyze_source, AnalysisOptions, Encoding, Runner};
pub use types::{
    AnalysisFinding, AnalysisReport, FileError, FileReport, LanguageStats, Summary,
};
pub use walk::{collect_files, relative_path, IgnoreMatcher, WalkedFile};
