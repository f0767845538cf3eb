//! Pattern-based code analysis.
//!
//! This module finds function and class declarations in source text and
//! decides whether each one is documented. It deliberately stops short of a
//! real parser: every language is a [`LanguageProfile`] value, and one set of
//! shared algorithms is parameterised by those profiles.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐     ┌───────────┐
//! │ Source text │────▶│ Scanner      │────▶│ Classifier  │────▶│ Extractor │
//! └─────────────┘     │ (candidates) │     │ (doc check) │     │ (Context) │
//!        ▲            └──────────────┘     └─────────────┘     └───────────┘
//!        │
//! ┌─────────────┐
//! │ Profiles    │  resolve(path) -> &LanguageProfile
//! └─────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Add a `LanguageProfile` static in `profiles.rs`
//! 2. Give it declaration rules (regexes with a `name` group)
//! 3. Register it in `PROFILES` and map its extensions in `EXTENSIONS`
//!
//! See the `GO` profile for a small, complete example.

mod classifier;
mod context;
mod facts;
mod lexer;
pub mod profiles;
mod scanner;

pub use classifier::{has_documentation, has_inner_doc, has_preceding_doc, DEFAULT_LOOKBACK};
pub use context::{extract, DEFAULT_MAX_BODY_LINES};
pub use facts::{Context, DeclarationCandidate, DeclarationKind, ParamList};
pub use lexer::{LineMasker, MaskedLine};
pub use profiles::{resolve, DocPlacement, LanguageProfile};
pub use scanner::{indent_width, scan, Scanner, PRECEDING_WINDOW};
