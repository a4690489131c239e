// src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FameError>;

#[derive(Error, Debug)]
pub enum FameError {
    #[error("malformed blame output at line {line}: {reason}")]
    MalformedBlameOutput { line: usize, reason: String },

    #[error("unknown sort key '{0}' (expected lines, commits or files)")]
    UnknownSortKey(String),

    #[error("unsupported format '{0}' (expected tabular, csv, json or json-lines)")]
    UnknownFormat(String),

    #[error("git {command} failed for {file}: {stderr}")]
    GitCommand {
        command: String,
        file: String,
        stderr: String,
    },

    #[error("not a git repository: {0}")]
    InvalidRepository(String),

    #[error("invalid revision: {0}")]
    InvalidRevision(String),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A single file that could not be attributed. Collected by the
/// coordinator and reported after every file has been processed.
#[derive(Error, Debug)]
#[error("failed to process {file}: {cause}")]
pub struct FileProcessingError {
    pub file: String,
    #[source]
    pub cause: FameError,
}
