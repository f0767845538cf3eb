//! docgap - find undocumented functions and classes.
//!
//! docgap walks a source tree, finds function, method and class
//! declarations in eight languages, and reports the ones without a doc
//! comment together with the context a comment generator needs.
//!
//! # Architecture
//!
//! - `analysis`: language profiles and the per-file pipeline (scanner,
//!   documentation classifier, context extractor)
//! - `scan`: directory walk, ignore patterns and the parallel orchestrator
//! - `generate`: doc comment generation from a declaration's context
//! - `patch`: planning, rendering and applying comment insertions
//! - `config`: YAML configuration schema and discovery
//! - `report`: Output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```no_run
//! let report = docgap::analyze("src", &[], &[]).unwrap();
//! for (file, ctx) in report.undocumented() {
//!     println!("{}:{} {}", file.path, ctx.line, ctx.name);
//! }
//! ```
//!
//! # Adding a New Language
//!
//! See `src/analysis/profiles.rs`. A language is a `LanguageProfile` value;
//! nothing else needs to change.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod patch;
pub mod report;
pub mod scan;

pub use analysis::{Context, DeclarationCandidate, DeclarationKind, LanguageProfile, ParamList};
pub use config::Config;
pub use error::{Error, Result};
pub use generate::{CommentGenerator, TemplateGenerator};
pub use patch::{apply_edits, plan_edits, render_diff, Edit, FileEdits, LocalWriter, Publisher};
pub use scan::{analyze, AnalysisReport, FileError, FileReport, Runner};
