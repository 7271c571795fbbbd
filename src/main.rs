//! Main entry point for the stew application.
//!
//! This file handles command-line parsing, logging setup and parameter clamping, and
//! orchestrates the selection of a diverse subset of reads in single-end or paired-end
//! mode. Selected reads are written to the output files given on the command line.

use std::env;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use crate::cli::{Cli, Mode, PairRule};
use crate::engine::ScoreEngine;
use crate::io_utils::{ReadStream, create_output, default_log_path, sample_id_from_filename};
use crate::logging::setup_logger;
use crate::pipeline::{PairedWriters, run_paired, run_single};
use crate::progress::record_spinner;
use crate::run_config::RunConfig;
use crate::sketch::HllSketch;

mod cli;
pub mod engine;
pub mod io_utils;
pub mod logging;
pub mod partition;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod run_config;
pub mod sketch;

/// Common initialization required by all commands.
fn init(threads: usize) -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    info!("{} v{}", env!("CARGO_PKG_NAME"), VERSION);
    info!("{}", env::args().collect::<Vec<String>>().join(" "));

    info!("Using {} threads.", threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;

    Ok(())
}

/// Clamp the scoring parameters, warning about every adjusted value.
fn run_config(args: &Cli) -> RunConfig {
    let (config, warnings) = RunConfig::clamped(&args.scoring.raw_params());
    for warning in &warnings {
        warn!("{}", warning);
    }

    info!(
        "Scoring with {} platters, {} cups, k = {}, threshold = {}, momentum = {}.",
        config.platters(),
        config.cups(),
        config.k(),
        config.threshold(),
        config.momentum()
    );

    config
}

fn open_input(path: &Path) -> Result<ReadStream> {
    info!("Reading {} from {}", sample_id_from_filename(path), path.display());
    let reads = ReadStream::open(path)?;
    if reads.is_empty_source() {
        warn!("Input file {} is empty.", path.display());
    }

    Ok(reads)
}

fn main() -> Result<()> {
    let start = Instant::now();

    let args = Cli::parse();

    let log_file = match (&args.log_file, &args.mode) {
        (Some(log_file), _) => log_file.clone(),
        (None, Mode::Single { output, .. }) => default_log_path(output),
        (None, Mode::Paired { output1, .. }) => default_log_path(output1),
    };
    setup_logger(&log_file)?;

    init(args.threads)?;

    let config = run_config(&args);

    let summary = match &args.mode {
        Mode::Single { input, output } => {
            info!("Single end mode.");
            let mut reads = open_input(input)?;
            let mut writer = create_output(output)?;
            let mut engine = ScoreEngine::<HllSketch>::new(&config)?;

            let summary = run_single(&mut reads, &mut writer, &mut engine, args.max_records, &record_spinner())?;
            summary.report("records", 1);
            summary
        }
        Mode::Paired { input1, input2, output1, output2, pair_rule } => {
            let mates = match pair_rule {
                PairRule::All => "both",
                PairRule::Any => "either",
            };
            info!("Paired end mode; keeping pairs where {} mates are selected.", mates);
            let mut reads1 = open_input(input1)?;
            let mut reads2 = open_input(input2)?;
            let mut writer1 = create_output(output1)?;
            let mut writer2 = create_output(output2)?;
            let mut engine1 = ScoreEngine::<HllSketch>::new(&config)?;
            let mut engine2 = ScoreEngine::<HllSketch>::new(&config)?;

            let summary = run_paired(
                (&mut reads1, &mut reads2),
                PairedWriters { first: &mut writer1, second: &mut writer2 },
                (&mut engine1, &mut engine2),
                *pair_rule,
                args.max_records,
                &record_spinner(),
            )?;
            summary.report("pairs", 2);
            summary
        }
    };

    if args.max_records.is_some_and(|max| summary.processed >= max) {
        info!("Stopped after reaching the limit of {} records.", summary.processed);
    }

    info!("Elapsed time (sec): {:.2}", start.elapsed().as_secs_f32());
    info!("Done.");

    Ok(())
}
