// src/ordering.rs

use crate::error::FameError;
use crate::model::ContributorStats;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Lines,
    Commits,
    Files,
}

type Metric = fn(&ContributorStats) -> u64;

fn lines(s: &ContributorStats) -> u64 {
    s.lines
}

fn commits(s: &ContributorStats) -> u64 {
    s.commits
}

fn files(s: &ContributorStats) -> u64 {
    s.files
}

impl SortKey {
    /// Metrics compared in order, all descending
    fn metrics(self) -> [Metric; 3] {
        match self {
            SortKey::Lines => [lines, commits, files],
            SortKey::Commits => [commits, lines, files],
            SortKey::Files => [files, lines, commits],
        }
    }
}

impl FromStr for SortKey {
    type Err = FameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lines" => Ok(SortKey::Lines),
            "commits" => Ok(SortKey::Commits),
            "files" => Ok(SortKey::Files),
            other => Err(FameError::UnknownSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Lines => write!(f, "lines"),
            SortKey::Commits => write!(f, "commits"),
            SortKey::Files => write!(f, "files"),
        }
    }
}

/// Total order used for every report: the requested metric first, then
/// the remaining metrics, all descending, then the name ascending without
/// regard to case. Names equal up to case fall back to a byte comparison.
pub fn compare(a: &ContributorStats, b: &ContributorStats, key: SortKey) -> Ordering {
    key.metrics()
        .iter()
        .fold(Ordering::Equal, |acc, metric| acc.then_with(|| metric(b).cmp(&metric(a))))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

pub fn sort_contributors(contributors: &mut [ContributorStats], key: SortKey) {
    contributors.sort_by(|a, b| compare(a, b, key));
}
