// src/cli.rs

use crate::error::Result;
use crate::languages::LanguageTable;
use crate::model::IdentityMode;
use crate::ordering::SortKey;
use crate::renderer::OutputFormat;
use crate::repository::Filters;
use clap::Parser;
use std::path::PathBuf;

fn parse_workers(s: &str) -> std::result::Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser, Debug)]
#[command(name = "gitfame", author, version, about, long_about = None)]
pub struct Args {
    /// Path inside the git work tree to analyze
    #[arg(long, env = "GITFAME_REPOSITORY", default_value = ".")]
    pub repository: PathBuf,

    /// Revision to take the snapshot at
    #[arg(long, env = "GITFAME_REVISION", default_value = "HEAD")]
    pub revision: String,

    /// Sort key: lines, commits or files
    #[arg(long, env = "GITFAME_ORDER_BY", default_value = "lines")]
    pub order_by: String,

    /// Attribute lines to the committer instead of the author
    #[arg(long, env = "GITFAME_USE_COMMITTER")]
    pub use_committer: bool,

    /// Output format: tabular, csv, json or json-lines
    #[arg(long, env = "GITFAME_FORMAT", default_value = "tabular")]
    pub format: String,

    /// Only files with these extensions, e.g. '.go,.md'
    #[arg(long, env = "GITFAME_EXTENSIONS", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Only files of these languages, e.g. 'go,markdown'
    #[arg(long, env = "GITFAME_LANGUAGES", value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Skip files matching any of these globs
    #[arg(long, env = "GITFAME_EXCLUDE", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Only files matching at least one of these globs
    #[arg(long, env = "GITFAME_RESTRICT_TO", value_delimiter = ',')]
    pub restrict_to: Vec<String>,

    /// Number of files blamed in parallel (default: number of CPUs)
    #[arg(long, env = "GITFAME_WORKERS", value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Show a progress bar on stderr
    #[arg(long, env = "GITFAME_PROGRESS")]
    pub progress: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "GITFAME_LOG_LEVEL", default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

/// Everything a run needs, validated
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub repository: PathBuf,
    pub revision: String,
    pub sort_key: SortKey,
    pub format: OutputFormat,
    pub mode: IdentityMode,
    pub filters: Filters,
    pub workers: usize,
    pub progress: bool,
}

impl Args {
    /// Validate sort key and format up front so a bad value fails before
    /// any file is blamed.
    pub fn run_options(&self) -> Result<RunOptions> {
        let sort_key: SortKey = self.order_by.parse()?;
        let format: OutputFormat = self.format.parse()?;

        let mut extensions = self.extensions.clone();
        if !self.languages.is_empty() {
            extensions.extend(LanguageTable::load()?.extensions_for(&self.languages));
        }

        Ok(RunOptions {
            repository: self.repository.clone(),
            revision: self.revision.clone(),
            sort_key,
            format,
            mode: if self.use_committer {
                IdentityMode::Committer
            } else {
                IdentityMode::Author
            },
            filters: Filters {
                exclude: self.exclude.clone(),
                restrict_to: self.restrict_to.clone(),
                extensions,
            },
            workers: self.workers.unwrap_or_else(num_cpus::get),
            progress: self.progress,
        })
    }
}
