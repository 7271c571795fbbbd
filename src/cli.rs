//! Command-line interface definition for the stew application.
//!
//! This file defines the `Cli` struct using the `clap` crate. Reads are processed in
//! single-end (`S`) or paired-end (`P`) mode, each taking its input and output files as
//! positional arguments. Scoring parameters are accepted as wide numeric values and
//! clamped into range later, so that out-of-range values produce a warning instead of
//! an error. The CLI output is styled using the `anstyle` crate for improved readability.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::run_config::{
    DEFAULT_CUPS, DEFAULT_KMER_LENGTH, DEFAULT_MOMENTUM, DEFAULT_PLATTERS, DEFAULT_THRESHOLD, RawParams,
};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Diversify and subsample reads into a stew!")]
#[command(styles=get_styles())]
#[command(disable_help_subcommand = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Mode,

    #[command(flatten)]
    pub scoring: ScoringArgs,

    /// Number of threads to use
    #[arg(short, long, global = true, default_value_t = 1, value_parser = validate_threads)]
    pub threads: usize,

    /// Stop after this many records (or pairs) and report the summary so far
    #[arg(long, global = true)]
    pub max_records: Option<u64>,

    /// Log file [default: stew.log beside the first output file]
    #[arg(long, global = true, value_parser = clap::value_parser!(PathBuf))]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Mode {
    /// Single end read mode
    #[command(name = "S", alias = "single")]
    Single {
        /// Input FASTA/FASTQ file (optionally gzipped)
        #[arg(value_parser = clap::value_parser!(PathBuf))]
        input: PathBuf,

        /// Output file for selected reads
        #[arg(value_parser = clap::value_parser!(PathBuf))]
        output: PathBuf,
    },

    /// Paired end read mode
    #[command(name = "P", alias = "paired")]
    Paired {
        /// Input file with first mates
        #[arg(value_parser = clap::value_parser!(PathBuf))]
        input1: PathBuf,

        /// Input file with second mates
        #[arg(value_parser = clap::value_parser!(PathBuf))]
        input2: PathBuf,

        /// Output file for selected first mates
        #[arg(value_parser = clap::value_parser!(PathBuf))]
        output1: PathBuf,

        /// Output file for selected second mates
        #[arg(value_parser = clap::value_parser!(PathBuf))]
        output2: PathBuf,

        /// Keep a pair when all or any of its mates are selected
        #[arg(long, value_enum, default_value_t = PairRule::All)]
        pair_rule: PairRule,
    },
}

/// Rule combining the decisions for the two mates of a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PairRule {
    /// Both mates must be selected
    All,
    /// At least one mate must be selected
    Any,
}

impl PairRule {
    pub fn keep(self, first: bool, second: bool) -> bool {
        match self {
            PairRule::All => first && second,
            PairRule::Any => first || second,
        }
    }
}

#[derive(Args)]
pub struct ScoringArgs {
    /// Number of platters (arrays) of HLL structures [1, 50]
    #[arg(short, long, global = true, help_heading = "Scoring parameters", default_value_t = DEFAULT_PLATTERS as i64, allow_negative_numbers = true)]
    pub platters: i64,

    /// Sketch precision as register bits per HLL structure [4, 16]
    #[arg(short, long, global = true, help_heading = "Scoring parameters", default_value_t = i64::from(DEFAULT_CUPS), allow_negative_numbers = true)]
    pub cups: i64,

    /// Length of k-mers to use [1, 100]
    #[arg(short, long, global = true, help_heading = "Scoring parameters", default_value_t = DEFAULT_KMER_LENGTH as i64, allow_negative_numbers = true)]
    pub kmer_length: i64,

    /// Minimum uniqueness score a read must exceed to be selected [0, 1]
    #[arg(short = 'x', long, global = true, help_heading = "Scoring parameters", default_value_t = DEFAULT_THRESHOLD, allow_negative_numbers = true)]
    pub threshold: f64,

    /// Momentum added to the uniqueness score as the stream grows [0, 0.001]
    #[arg(short, long, global = true, help_heading = "Scoring parameters", default_value_t = DEFAULT_MOMENTUM, allow_negative_numbers = true)]
    pub momentum: f64,
}

impl ScoringArgs {
    pub fn raw_params(&self) -> RawParams {
        RawParams {
            platters: self.platters,
            cups: self.cups,
            kmer_length: self.kmer_length,
            threshold: self.threshold,
            momentum: self.momentum,
        }
    }
}

fn validate_threads(threads: &str) -> Result<usize, String> {
    let threads: usize = threads
        .parse()
        .map_err(|_| format!("`{threads}` isn't a valid value"))?;

    if !(1..=1024).contains(&threads) {
        return Err("Threads  must be in the range [1, 1024]".to_string());
    }

    Ok(threads)
}

fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
        .literal(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .invalid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .valid(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .placeholder(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_single_mode_defaults() {
        let cli = Cli::try_parse_from(["stew", "S", "in.fq", "out.fq"]).unwrap();
        assert!(matches!(cli.mode, Mode::Single { .. }));
        assert_eq!(cli.scoring.raw_params(), RawParams::default());
        assert_eq!(cli.threads, 1);
        assert_eq!(cli.max_records, None);
    }

    #[test]
    fn test_out_of_range_values_are_accepted() {
        let cli = Cli::try_parse_from(["stew", "-c", "20", "-k", "150", "S", "-m", "0.01", "-p", "-2", "in.fq", "out.fq"]).unwrap();
        let raw = cli.scoring.raw_params();
        assert_eq!(raw.cups, 20);
        assert_eq!(raw.kmer_length, 150);
        assert_eq!(raw.momentum, 0.01);
        assert_eq!(raw.platters, -2);
    }

    #[test]
    fn test_paired_mode() {
        let cli = Cli::try_parse_from(["stew", "paired", "--pair-rule", "any", "a.fq", "b.fq", "c.fq", "d.fq"]).unwrap();
        match cli.mode {
            Mode::Paired { input2, output2, pair_rule, .. } => {
                assert_eq!(input2, PathBuf::from("b.fq"));
                assert_eq!(output2, PathBuf::from("d.fq"));
                assert_eq!(pair_rule, PairRule::Any);
            }
            Mode::Single { .. } => panic!("expected paired mode"),
        }
    }

    #[test]
    fn test_configuration_errors() {
        assert!(Cli::try_parse_from(["stew", "X", "in.fq", "out.fq"]).is_err());
        assert!(Cli::try_parse_from(["stew", "S", "in.fq"]).is_err());
        assert!(Cli::try_parse_from(["stew", "S", "in.fq", "out.fq", "extra.fq"]).is_err());
        assert!(Cli::try_parse_from(["stew", "P", "a.fq", "b.fq", "c.fq"]).is_err());
        assert!(Cli::try_parse_from(["stew", "-t", "0", "S", "in.fq", "out.fq"]).is_err());
    }

    #[test]
    fn test_pair_rule() {
        assert!(PairRule::All.keep(true, true));
        assert!(!PairRule::All.keep(true, false));
        assert!(PairRule::Any.keep(false, true));
        assert!(!PairRule::Any.keep(false, false));
    }
}
