// src/repository.rs

use crate::error::{FameError, Result};
use chrono::{DateTime, TimeZone, Utc};
use git2::{ObjectType, Repository, TreeWalkMode, TreeWalkResult};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path selection applied to the files of a revision
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub exclude: Vec<String>,
    pub restrict_to: Vec<String>,
    /// With the leading dot, e.g. `.rs`
    pub extensions: Vec<String>,
}

struct FileFilter {
    restrict_to: Option<GlobSet>,
    exclude: Option<GlobSet>,
    extensions: HashSet<String>,
}

fn glob_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    }
    Ok(Some(builder.build()?))
}

/// Extension of the last path component including the dot, or "".
fn extension_of(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rfind('.').map_or("", |idx| &name[idx..])
}

impl FileFilter {
    fn new(filters: &Filters) -> Result<Self> {
        Ok(Self {
            restrict_to: glob_set(&filters.restrict_to)?,
            exclude: glob_set(&filters.exclude)?,
            extensions: filters.extensions.iter().cloned().collect(),
        })
    }

    fn accepts(&self, path: &str) -> bool {
        if let Some(restrict_to) = &self.restrict_to {
            if !restrict_to.is_match(path) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(path) {
                return false;
            }
        }
        self.extensions.is_empty() || self.extensions.contains(extension_of(path))
    }
}

/// The tracked files of one revision, after filtering
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub root: PathBuf,
    pub revision: String,
    pub commit_id: String,
    pub committed_at: Option<DateTime<Utc>>,
    pub files: Vec<String>,
}

impl Snapshot {
    /// Open the repository containing `path` and list the files of
    /// `revision` that pass `filters`, in tree order.
    pub fn open(path: &Path, revision: &str, filters: &Filters) -> Result<Self> {
        if !path.exists() {
            return Err(FameError::InvalidRepository(format!(
                "directory does not exist: {}",
                path.display()
            )));
        }

        let repo = Repository::discover(path)
            .map_err(|_| FameError::InvalidRepository(path.display().to_string()))?;
        let root = repo
            .workdir()
            .ok_or_else(|| FameError::InvalidRepository(format!("{} is bare", repo.path().display())))?
            .to_path_buf();

        let commit = repo
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|_| FameError::InvalidRevision(revision.to_string()))?;

        let filter = FileFilter::new(filters)?;
        let mut files = Vec::new();
        commit.tree()?.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    let path = format!("{}{}", dir, name);
                    if filter.accepts(&path) {
                        files.push(path);
                    }
                }
            }
            TreeWalkResult::Ok
        })?;

        debug!("{} files selected at {}", files.len(), revision);

        Ok(Self {
            root,
            revision: revision.to_string(),
            commit_id: commit.id().to_string(),
            committed_at: Utc.timestamp_opt(commit.time().seconds(), 0).single(),
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn filters(exclude: &[&str], restrict_to: &[&str], extensions: &[&str]) -> Filters {
        Filters {
            exclude: owned(exclude),
            restrict_to: owned(restrict_to),
            extensions: owned(extensions),
        }
    }

    fn accepted(filters: &Filters, paths: &[&str]) -> Vec<String> {
        let filter = FileFilter::new(filters).unwrap();
        paths
            .iter()
            .filter(|p| filter.accepts(p))
            .map(|p| p.to_string())
            .collect()
    }

    const PATHS: [&str; 5] = ["main.go", "README.md", "docs/guide.md", "vendor/lib.go", "Makefile"];

    #[test]
    fn test_no_filters_accept_everything() {
        assert_eq!(accepted(&Filters::default(), &PATHS).len(), PATHS.len());
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let f = filters(&["*.md"], &[], &[]);
        assert_eq!(
            accepted(&f, &PATHS),
            vec!["main.go", "docs/guide.md", "vendor/lib.go", "Makefile"]
        );
    }

    #[test]
    fn test_restrict_then_exclude_then_extension() {
        let f = filters(&["vendor/*"], &["*.go", "vendor/*", "*/*.md"], &[".go"]);
        assert_eq!(accepted(&f, &PATHS), vec!["main.go"]);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("src/main.rs"), ".rs");
        assert_eq!(extension_of("a.b/Makefile"), "");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of(".gitignore"), ".gitignore");
    }

    #[test]
    fn test_invalid_glob_is_error() {
        let f = filters(&["[unclosed"], &[], &[]);
        assert!(matches!(FileFilter::new(&f), Err(FameError::Glob(_))));
    }
}
