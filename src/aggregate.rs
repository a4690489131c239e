// src/aggregate.rs

use crate::model::{AttributionTable, ContributorStats};
use std::collections::HashMap;

/// Fold per-commit records into one entry per identity.
///
/// The returned order is unspecified; see `ordering::sort_contributors`.
pub fn aggregate(table: &AttributionTable) -> Vec<ContributorStats> {
    // identity -> (lines, commits)
    let mut totals: HashMap<&str, (u64, u64)> = HashMap::new();
    for record in table.commits() {
        let entry = totals.entry(record.identity.as_str()).or_default();
        entry.0 += record.total_lines;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(name, (lines, commits))| ContributorStats {
            name: name.to_string(),
            lines,
            commits,
            files: table.files_of(name) as u64,
        })
        .collect()
}
