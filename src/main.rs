// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use gitfame::aggregate::aggregate;
use gitfame::analyzer::{self, AnalyzeOptions};
use gitfame::cli::{Args, RunOptions};
use gitfame::ordering::sort_contributors;
use gitfame::progress::{self, ProgressSink};
use gitfame::renderer;
use gitfame::repository::Snapshot;
use gitfame::source::GitCli;
use std::io::{self, Write};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(options: &RunOptions) -> Result<()> {
    let start_time = Instant::now();

    let snapshot = Snapshot::open(&options.repository, &options.revision, &options.filters)
        .context("Failed to open repository snapshot")?;
    info!(
        "Snapshot {} ({}) at {}: {} files",
        snapshot.revision,
        snapshot.commit_id,
        snapshot
            .committed_at
            .map_or_else(|| "unknown time".to_string(), |t| t.to_rfc2822()),
        snapshot.files.len()
    );

    info!(
        "Attributing by {:?} with {} workers, ordered by {}, printed as {}",
        options.mode, options.workers, options.sort_key, options.format
    );

    let source = GitCli::new(&snapshot.root, &snapshot.revision);
    let bar = options.progress.then(progress::file_bar);
    let analyze_options = AnalyzeOptions {
        workers: options.workers,
        mode: options.mode,
    };
    let attribution = analyzer::analyze(
        &snapshot.files,
        &source,
        analyze_options,
        bar.as_ref().map(|b| b as &dyn ProgressSink),
    )
    .context("Failed to attribute files")?;

    for error in &attribution.errors {
        warn!("{}", error);
    }
    if !attribution.errors.is_empty() {
        warn!(
            "{} of {} files were skipped",
            attribution.errors.len(),
            snapshot.files.len()
        );
    }

    let mut contributors = aggregate(&attribution.table);
    sort_contributors(&mut contributors, options.sort_key);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    renderer::render(&contributors, options.format, &mut out).context("Failed to write results")?;
    out.flush()?;

    info!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let options = args.run_options().context("Invalid arguments")?;
    run(&options)
}
