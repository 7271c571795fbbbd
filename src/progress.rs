//! Utilities for creating and styling progress indicators using the `indicatif` crate.
//!
//! Read streams have no known length up front, so progress is shown as a spinner
//! with a running record count and throughput.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner counting processed records.
pub fn record_spinner() -> ProgressBar {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(ProgressStyle::default_spinner().template(
        "[{elapsed_precise}] {spinner:.cyan} {human_pos} records [{per_sec}] [{msg}]",
    ).expect("Invalid progress style."));
    progress_bar.enable_steady_tick(Duration::from_millis(200));

    progress_bar
}
