//! Error types for run-level failures.
//!
//! Only configuration and root-level problems are errors. Anything that goes
//! wrong inside a single file is recorded on that file's report instead (see
//! [`crate::scan::FileError`]).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an analysis run before or while walking the root.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid ignore pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("unknown language {0:?} in allowlist")]
    UnknownLanguage(String),
    #[error("unsupported encoding {0:?} (expected utf-8 or latin-1)")]
    UnsupportedEncoding(String),
    #[error("root path does not exist: {0}")]
    RootNotFound(PathBuf),
    #[error("root path is not a directory: {0}")]
    RootNotDirectory(PathBuf),
    #[error("walking {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("cannot patch {path}: {message}")]
    Patch { path: PathBuf, message: String },
    #[error("building worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result alias for run-level operations.
pub type Result<T> = std::result::Result<T, Error>;
