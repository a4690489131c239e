// src/source.rs

use crate::error::{FameError, Result};
use crate::model::IdentityMode;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Supplies the raw text the blame parser consumes.
///
/// Implementations are called from several worker threads at once.
pub trait BlameSource: Send + Sync {
    /// Porcelain blame of `file` at the snapshot revision
    fn blame(&self, file: &str) -> Result<String>;

    /// Log rendering of the latest commit touching `file`. Its first two
    /// lines are `commit <id>` and `Author: <name> <email>`; in committer
    /// mode the header also carries a `Commit: <name> <email>` line.
    fn history(&self, file: &str, mode: IdentityMode) -> Result<String>;
}

/// Runs the `git` binary inside the repository root.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    revision: String,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>, revision: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            revision: revision.into(),
        }
    }

    fn run(&self, subcommand: &str, args: &[&str], file: &str) -> Result<String> {
        debug!("git {} {}", subcommand, file);
        let output = Command::new("git")
            .arg(subcommand)
            .args(args)
            .arg(&self.revision)
            .arg("--")
            .arg(file)
            .current_dir(&self.root)
            .output()?;

        if !output.status.success() {
            return Err(FameError::GitCommand {
                command: subcommand.to_string(),
                file: file.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl BlameSource for GitCli {
    fn blame(&self, file: &str) -> Result<String> {
        self.run("blame", &["--porcelain"], file)
    }

    fn history(&self, file: &str, mode: IdentityMode) -> Result<String> {
        let format = match mode {
            IdentityMode::Author => "--format=medium",
            IdentityMode::Committer => "--format=fuller",
        };
        self.run("log", &["-1", "--no-decorate", format], file)
    }
}
