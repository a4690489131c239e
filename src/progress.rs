// src/progress.rs

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Receives one tick per processed file
pub trait ProgressSink: Send + Sync {
    fn start(&self, total: u64);
    fn advance(&self);
    fn close(&self);
}

impl ProgressSink for ProgressBar {
    fn start(&self, total: u64) {
        self.set_length(total);
        self.set_position(0);
    }

    fn advance(&self) {
        self.inc(1);
    }

    fn close(&self) {
        self.finish_and_clear();
    }
}

/// Bar drawn on stderr so the report on stdout stays clean
pub fn file_bar() -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("█▓░"));
    }
    bar.set_message("Blaming files");
    bar
}
