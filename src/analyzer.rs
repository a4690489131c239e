// src/analyzer.rs

use crate::blame::{parse_blame, parse_history};
use crate::error::{FileProcessingError, Result};
use crate::model::{AttributionTable, BlameFact, IdentityMode};
use crate::progress::ProgressSink;
use crate::source::BlameSource;
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    /// Upper bound on files processed at the same time
    pub workers: usize,
    pub mode: IdentityMode,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            mode: IdentityMode::Author,
        }
    }
}

/// Merged state of a finished run
#[derive(Debug)]
pub struct Attribution {
    pub table: AttributionTable,
    /// Files that contributed nothing because retrieval or parsing failed,
    /// in input order
    pub errors: Vec<FileProcessingError>,
}

/// Facts for one file. Falls back to the latest commit touching the file
/// when its blame has no hunks at all.
pub fn file_facts(source: &dyn BlameSource, file: &str, mode: IdentityMode) -> Result<Vec<BlameFact>> {
    let parsed = parse_blame(&source.blame(file)?, mode)?;
    if !parsed.is_empty() {
        return Ok(parsed.facts);
    }

    debug!("{} has no blamed lines, using its latest commit", file);
    let history = source.history(file, mode)?;
    Ok(parse_history(&history, mode).into_iter().collect())
}

/// Blame one file and merge its facts into `table` under a single lock.
pub fn process_file(
    source: &dyn BlameSource,
    file: &str,
    mode: IdentityMode,
    table: &Mutex<AttributionTable>,
) -> std::result::Result<(), FileProcessingError> {
    let facts = file_facts(source, file, mode).map_err(|cause| FileProcessingError {
        file: file.to_string(),
        cause,
    })?;

    let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
    table.merge(file, &facts);
    Ok(())
}

/// Attribute every file with at most `options.workers` files in flight.
///
/// Returns only once all files are done. A failing file is recorded in
/// `Attribution::errors` and does not stop the others. `progress`, when
/// given, gets one `advance` per file and a single `close` at the end.
pub fn analyze(
    files: &[String],
    source: &dyn BlameSource,
    options: AnalyzeOptions,
    progress: Option<&dyn ProgressSink>,
) -> Result<Attribution> {
    let started = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()?;

    let table = Mutex::new(AttributionTable::new());
    if let Some(bar) = progress {
        bar.start(files.len() as u64);
    }

    let errors: Vec<FileProcessingError> = pool.install(|| {
        files
            .par_iter()
            .filter_map(|file| {
                let outcome = process_file(source, file, options.mode, &table);
                if let Some(bar) = progress {
                    bar.advance();
                }
                outcome.err()
            })
            .collect()
    });

    if let Some(bar) = progress {
        bar.close();
    }

    let table = table.into_inner().unwrap_or_else(PoisonError::into_inner);
    info!(
        "Blamed {} files in {:.2?}: {} commits, {} failed",
        files.len(),
        started.elapsed(),
        table.commit_count(),
        errors.len()
    );

    Ok(Attribution { table, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FameError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    const C1: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const C2: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[derive(Default)]
    struct FakeSource {
        blames: HashMap<String, String>,
        histories: HashMap<String, String>,
        delay: Option<Duration>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeSource {
        fn with_blame(mut self, file: &str, text: String) -> Self {
            self.blames.insert(file.to_string(), text);
            self
        }

        fn with_history(mut self, file: &str, text: String) -> Self {
            self.histories.insert(file.to_string(), text);
            self
        }
    }

    impl BlameSource for FakeSource {
        fn blame(&self, file: &str) -> Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.blames.get(file).cloned().ok_or_else(|| FameError::GitCommand {
                command: "blame".to_string(),
                file: file.to_string(),
                stderr: "no such path".to_string(),
            })
        }

        fn history(&self, file: &str, _mode: IdentityMode) -> Result<String> {
            Ok(self.histories.get(file).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct CountingSink {
        started: AtomicUsize,
        advanced: AtomicUsize,
        closed: AtomicUsize,
    }

    impl ProgressSink for CountingSink {
        fn start(&self, _total: u64) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn advance(&self) {
            self.advanced.fetch_add(1, Ordering::SeqCst);
        }

        fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn hunk(commit: &str, author: &str, lines: u64) -> String {
        format!("{commit} 1 1 {lines}\nauthor {author}\ncommitter {author}\nfilename f\n\tx\n")
    }

    fn options(workers: usize) -> AnalyzeOptions {
        AnalyzeOptions {
            workers,
            mode: IdentityMode::Author,
        }
    }

    fn names(files: &[&str]) -> Vec<String> {
        files.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_lines_sum_across_files() {
        let source = FakeSource::default()
            .with_blame("a.rs", hunk(C1, "Alice", 3))
            .with_blame("b.rs", format!("{}{}", hunk(C1, "Alice", 2), hunk(C2, "Bob", 5)));

        let result = analyze(&names(&["a.rs", "b.rs"]), &source, options(2), None).unwrap();
        assert!(result.errors.is_empty());
        assert_eq!(result.table.commit(C1).unwrap().total_lines, 5);
        assert_eq!(result.table.commit(C2).unwrap().total_lines, 5);
        assert_eq!(result.table.files_of("Alice"), 2);
        assert_eq!(result.table.files_of("Bob"), 1);
    }

    #[test]
    fn test_processing_same_file_twice_doubles_lines() {
        let source = FakeSource::default().with_blame("a.rs", hunk(C1, "Alice", 7));
        let table = Mutex::new(AttributionTable::new());

        process_file(&source, "a.rs", IdentityMode::Author, &table).unwrap();
        process_file(&source, "a.rs", IdentityMode::Author, &table).unwrap();

        let table = table.into_inner().unwrap();
        assert_eq!(table.commit(C1).unwrap().total_lines, 14);
        assert_eq!(table.files_of("Alice"), 1);
    }

    #[test]
    fn test_empty_blame_uses_history() {
        let source = FakeSource::default()
            .with_blame("empty.txt", String::new())
            .with_history(
                "empty.txt",
                format!("commit {C2}\nAuthor: Carol <c@x.com>\nDate:   today\n"),
            );

        let facts = file_facts(&source, "empty.txt", IdentityMode::Author).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].identity, "Carol");
        assert_eq!(facts[0].lines, 0);
    }

    #[test]
    fn test_committer_mode_is_independent_of_merge_order() {
        let blame = format!(
            "{C1} 1 1 5\nauthor Alice\ncommitter Carl\nfilename main.rs\n\tfn main() {{}}\n"
        );
        let history = format!(
            "commit {C1}\nAuthor:     Alice <alice@x.com>\nAuthorDate: today\n\
             Commit:     Carl <carl@x.com>\nCommitDate: today\n\n    init\n"
        );
        let source = FakeSource::default()
            .with_blame("main.rs", blame)
            .with_blame("empty.txt", String::new())
            .with_history("empty.txt", history);

        let run = |order: [&str; 2]| {
            let table = Mutex::new(AttributionTable::new());
            for file in order {
                process_file(&source, file, IdentityMode::Committer, &table).unwrap();
            }
            let table = table.into_inner().unwrap();
            let record = table.commit(C1).unwrap();
            (record.identity.clone(), record.total_lines, table.files_of("Carl"))
        };

        let expected = ("Carl".to_string(), 5, 2);
        assert_eq!(run(["main.rs", "empty.txt"]), expected);
        assert_eq!(run(["empty.txt", "main.rs"]), expected);
    }

    #[test]
    fn test_unexpected_history_contributes_nothing() {
        let source = FakeSource::default()
            .with_blame("empty.txt", String::new())
            .with_history("empty.txt", "fatal: nothing here\n".to_string());

        let facts = file_facts(&source, "empty.txt", IdentityMode::Author).unwrap();
        assert!(facts.is_empty());
    }

    #[test]
    fn test_failed_files_do_not_stop_batch() {
        let source = FakeSource::default()
            .with_blame("good.rs", hunk(C1, "Alice", 4))
            .with_blame("bad.rs", format!("{C2} 1 one 1\n"));
        let sink = CountingSink::default();

        let files = names(&["missing.rs", "good.rs", "bad.rs"]);
        let result = analyze(&files, &source, options(2), Some(&sink as &dyn ProgressSink)).unwrap();

        let failed: Vec<&str> = result.errors.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(failed, vec!["missing.rs", "bad.rs"]);
        assert!(matches!(
            result.errors[1].cause,
            FameError::MalformedBlameOutput { .. }
        ));
        assert_eq!(result.table.commit(C1).unwrap().total_lines, 4);
        assert!(result.table.commit(C2).is_none());

        assert_eq!(sink.started.load(Ordering::SeqCst), 1);
        assert_eq!(sink.advanced.load(Ordering::SeqCst), 3);
        assert_eq!(sink.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_worker_bound_is_respected() {
        let files: Vec<String> = (0..24).map(|i| format!("f{i}.rs")).collect();
        let mut source = FakeSource {
            delay: Some(Duration::from_millis(15)),
            ..FakeSource::default()
        };
        for file in &files {
            source = source.with_blame(file, hunk(C1, "Alice", 1));
        }

        let result = analyze(&files, &source, options(3), None).unwrap();
        assert!(result.errors.is_empty());
        assert_eq!(result.table.commit(C1).unwrap().total_lines, 24);

        let peak = source.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 3, "peak concurrency was {peak}");
    }

    #[test]
    fn test_empty_file_list() {
        let source = FakeSource::default();
        let sink = CountingSink::default();
        let result = analyze(&[], &source, options(4), Some(&sink as &dyn ProgressSink)).unwrap();

        assert_eq!(result.table.commit_count(), 0);
        assert_eq!(sink.advanced.load(Ordering::SeqCst), 0);
        assert_eq!(sink.closed.load(Ordering::SeqCst), 1);
    }
}
