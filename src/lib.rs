//! gitfame: who owns the lines of a repository at a given revision.
//!
//! Every tracked file is blamed in parallel, each blamed line is attributed
//! to the author (or committer) of the commit that last touched it, and the
//! results are rolled up into per-contributor line, commit and file counts.
//!
//! Pipeline: `repository::Snapshot` lists the files, `analyzer::analyze`
//! blames them through a `source::BlameSource`, `aggregate::aggregate`
//! folds the commit table, `ordering::sort_contributors` orders it and
//! `renderer::render` prints it.

pub mod aggregate;
pub mod analyzer;
pub mod blame;
pub mod cli;
pub mod error;
pub mod languages;
pub mod model;
pub mod ordering;
pub mod progress;
pub mod renderer;
pub mod repository;
pub mod source;

pub use error::{FameError, FileProcessingError, Result};
pub use model::{ContributorStats, IdentityMode};
