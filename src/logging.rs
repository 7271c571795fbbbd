//! Logging setup utilities for the application.
//!
//! This module configures logging to both stderr and a log file using the `log4rs` crate.
//! The console only shows informational messages and above, while the log file also
//! records per-read diagnostics.

use std::path::Path;

use anyhow::Context;
use log::LevelFilter;
use log4rs::{
    append::{console::{ConsoleAppender, Target}, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const CONSOLE_LEVEL: LevelFilter = LevelFilter::Info;
const FILE_LEVEL: LevelFilter = LevelFilter::Trace;

/// Configure logger to write to stderr and `log_file`.
pub fn setup_logger(log_file: &Path) -> anyhow::Result<()>{
    let pattern = "[{d(%Y-%m-%d %H:%M:%S)}] {h({l})}: {m}{n}";

    // log to stderr
    let stderr = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .target(Target::Stderr)
        .build();

    // log to file
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .append(false)
        .build(log_file)
        .context(format!("Failed to create log file {}", log_file.display()))?;

    // configure logging
    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(CONSOLE_LEVEL)))
                .build("stderr", Box::new(stderr)),
        ).appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(FILE_LEVEL)))
                .build("logfile", Box::new(logfile)),
        )
        .build(Root::builder().appender("stderr").appender("logfile").build(LevelFilter::Trace))
        .context("Failed to configure logger.")?;

    log4rs::init_config(config).context("Failed to initialize logger.")?;
    Ok(())
}
