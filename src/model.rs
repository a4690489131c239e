// src/model.rs

use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Uniquely identifies a commit (40 hex digits)
pub type CommitId = String;

/// Raw author or committer name used as the aggregation key
pub type Identity = String;

/// Which signature of a commit a line is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityMode {
    #[default]
    Author,
    Committer,
}

/// One run of contiguous lines in one file attributed to one commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameFact {
    pub commit: CommitId,
    pub identity: Identity,
    pub lines: u64,
}

/// Lines accumulated for one commit across every file it touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub commit: CommitId,
    pub identity: Identity,
    pub total_lines: u64,
}

/// Final per-contributor totals, in the field order the renderers emit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributorStats {
    pub name: String,
    pub lines: u64,
    pub commits: u64,
    pub files: u64,
}

/// Shared state the workers merge into.
///
/// Merges are commutative: the final table is the same whatever order the
/// files are merged in.
#[derive(Debug, Default)]
pub struct AttributionTable {
    commits: HashMap<CommitId, CommitRecord>,
    files: HashMap<Identity, HashSet<String>>,
}

impl AttributionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's facts into the table.
    ///
    /// The first sighting of a commit fixes its identity; every later fact
    /// for that commit, from any file, only adds to its line total.
    pub fn merge(&mut self, file: &str, facts: &[BlameFact]) {
        for fact in facts {
            let record = self
                .commits
                .entry(fact.commit.clone())
                .or_insert_with(|| CommitRecord {
                    commit: fact.commit.clone(),
                    identity: fact.identity.clone(),
                    total_lines: 0,
                });
            record.total_lines += fact.lines;

            let owner = record.identity.clone();
            self.files.entry(owner).or_default().insert(file.to_string());
        }
    }

    pub fn commit(&self, id: &str) -> Option<&CommitRecord> {
        self.commits.get(id)
    }

    pub fn commits(&self) -> impl Iterator<Item = &CommitRecord> {
        self.commits.values()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Distinct files attributed to `identity`
    pub fn files_of(&self, identity: &str) -> usize {
        self.files.get(identity).map_or(0, HashSet::len)
    }
}
