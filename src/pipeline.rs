//! This module drives reads through the scoring engines and writes the selected ones.
//!
//! It provides functionality to:
//! - Score single-end reads in file order and write the selected reads.
//! - Score paired-end reads with one independent engine per mate file and keep pairs
//!   according to a `PairRule`.
//! - Accumulate run totals, reported once the stream ends or is cut short.

use std::io::Write;

use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use num_format::{Locale, ToFormattedString};

use crate::cli::PairRule;
use crate::engine::{ScoreEngine, ScoreOutcome};
use crate::io_utils::ReadStream;
use crate::record::SequenceRecord;
use crate::sketch::CardinalitySketch;

const PROGRESS_MSG_INTERVAL: u64 = 10_000;

/// Totals accumulated over a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Records (or pairs) read from the input.
    pub processed: u64,
    /// Records (or pairs) written to the output.
    pub selected: u64,
    /// Reads too short to be scored.
    pub degenerate: u64,
    /// Sum of the scores of all scored reads.
    pub score_sum: f64,
}

impl RunSummary {
    fn note_outcome(&mut self, record: &SequenceRecord, outcome: &ScoreOutcome) {
        self.score_sum += outcome.score;
        if let Some(reason) = outcome.degenerate {
            self.degenerate += 1;
            debug!(
                "Record {} ({}, {} bp) not scored: {:?}",
                outcome.record_index,
                record.name,
                record.seq.len(),
                reason
            );
        }
    }

    pub fn selected_percent(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            100.0 * self.selected as f64 / self.processed as f64
        }
    }

    /// Mean score over reads that were long enough to score.
    pub fn mean_score(&self, reads_per_record: u64) -> f64 {
        let scored = (self.processed * reads_per_record).saturating_sub(self.degenerate);
        if scored == 0 {
            0.0
        } else {
            self.score_sum / scored as f64
        }
    }

    /// Log the totals.
    pub fn report(&self, unit: &str, reads_per_record: u64) {
        if self.degenerate > 0 {
            warn!(
                "{} reads were too short to score and were not selected.",
                self.degenerate.to_formatted_string(&Locale::en)
            );
        }

        info!(
            "Selected {} of {} {} ({:.2}%).",
            self.selected.to_formatted_string(&Locale::en),
            self.processed.to_formatted_string(&Locale::en),
            unit,
            self.selected_percent()
        );
        info!("Mean uniqueness score of scored reads: {:.4}", self.mean_score(reads_per_record));
    }
}

fn update_progress(progress: &ProgressBar, summary: &RunSummary) {
    progress.inc(1);
    if summary.processed % PROGRESS_MSG_INTERVAL == 0 {
        progress.set_message(format!("{} selected", summary.selected.to_formatted_string(&Locale::en)));
    }
}

fn reached_limit(summary: &RunSummary, max_records: Option<u64>) -> bool {
    max_records.is_some_and(|max| summary.processed >= max)
}

/// Score single-end reads in file order, writing selected reads to `writer`.
///
/// If the input fails to decode part way through, the totals so far are logged
/// before the error is returned.
pub fn run_single<S, W>(
    reads: &mut ReadStream,
    writer: &mut W,
    engine: &mut ScoreEngine<S>,
    max_records: Option<u64>,
    progress: &ProgressBar,
) -> Result<RunSummary>
where
    S: CardinalitySketch,
    W: Write,
{
    let mut summary = RunSummary::default();

    while !reached_limit(&summary, max_records) {
        let record = match reads.next_record() {
            Some(Ok(record)) => record,
            Some(Err(e)) => {
                summary.report("records", 1);
                return Err(e.context(format!("Input error after {} records", summary.processed)));
            }
            None => break,
        };

        let outcome = engine.score(&record.seq);
        summary.processed += 1;
        summary.note_outcome(&record, &outcome);

        if outcome.decision.is_accept() {
            record.write_to(writer, record.is_fastq())?;
            summary.selected += 1;
        }

        update_progress(progress, &summary);
    }

    writer.flush().context("Failed to flush output")?;
    progress.finish();

    Ok(summary)
}

/// Output writers for the two mates of each pair.
pub struct PairedWriters<'a, W: Write> {
    pub first: &'a mut W,
    pub second: &'a mut W,
}

/// Score paired reads, one engine per mate file.
///
/// Each engine sees its own file strictly in order; the two mates of a pair are
/// scored concurrently when the thread pool has more than one thread. A pair is
/// written to both outputs when `rule` holds for the two decisions.
pub fn run_paired<S, W>(
    reads: (&mut ReadStream, &mut ReadStream),
    writers: PairedWriters<'_, W>,
    engines: (&mut ScoreEngine<S>, &mut ScoreEngine<S>),
    rule: PairRule,
    max_records: Option<u64>,
    progress: &ProgressBar,
) -> Result<RunSummary>
where
    S: CardinalitySketch + Send,
    W: Write,
{
    let (reads1, reads2) = reads;
    let (engine1, engine2) = engines;
    let concurrent = rayon::current_num_threads() > 1;
    let mut summary = RunSummary::default();

    while !reached_limit(&summary, max_records) {
        let (mate1, mate2) = match (reads1.next_record(), reads2.next_record()) {
            (Some(Ok(mate1)), Some(Ok(mate2))) => (mate1, mate2),
            (None, None) => break,
            (Some(Err(e)), _) | (_, Some(Err(e))) => {
                summary.report("pairs", 2);
                return Err(e.context(format!("Input error after {} pairs", summary.processed)));
            }
            (Some(_), None) | (None, Some(_)) => {
                summary.report("pairs", 2);
                bail!("Paired inputs have different numbers of records (mismatch after {} pairs)", summary.processed);
            }
        };

        let (outcome1, outcome2) = if concurrent {
            rayon::join(|| engine1.score(&mate1.seq), || engine2.score(&mate2.seq))
        } else {
            (engine1.score(&mate1.seq), engine2.score(&mate2.seq))
        };

        summary.processed += 1;
        summary.note_outcome(&mate1, &outcome1);
        summary.note_outcome(&mate2, &outcome2);

        if rule.keep(outcome1.decision.is_accept(), outcome2.decision.is_accept()) {
            mate1.write_to(&mut *writers.first, mate1.is_fastq())?;
            mate2.write_to(&mut *writers.second, mate2.is_fastq())?;
            summary.selected += 1;
        }

        update_progress(progress, &summary);
    }

    writers.first.flush().context("Failed to flush first output")?;
    writers.second.flush().context("Failed to flush second output")?;
    progress.finish();

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::run_config::RunConfig;
    use crate::run_config::tests::config;
    use crate::sketch::HllSketch;
    use crate::sketch::tests::ExactSketch;

    fn hidden_spinner() -> ProgressBar {
        ProgressBar::hidden()
    }

    fn stream(data: &'static [u8]) -> ReadStream {
        ReadStream::from_reader(Cursor::new(data)).unwrap()
    }

    fn exact_engine(k: usize, threshold: f64) -> ScoreEngine<ExactSketch> {
        ScoreEngine::new(&config(1, 8, k, threshold, 0.0)).unwrap()
    }

    #[test]
    fn test_duplicate_reads_dropped() -> Result<()> {
        let mut reads = stream(b"@r1 a\nACGTAC\n+\nIIIIII\n@r2 b\nACGTAC\n+\nIIIIII\n@r3 c\nTTGCAA\n+\nHHHHHH\n");
        let mut out = Vec::new();
        let mut engine = exact_engine(3, 0.2);

        let summary = run_single(&mut reads, &mut out, &mut engine, None, &hidden_spinner())?;

        assert_eq!((summary.processed, summary.selected, summary.degenerate), (3, 2, 0));
        assert_eq!(summary.mean_score(1), 2.0 / 3.0);
        assert_eq!(
            String::from_utf8(out)?,
            "@r1 a\nACGTAC\n+\nIIIIII\n@r3 c\nTTGCAA\n+\nHHHHHH\n"
        );
        Ok(())
    }

    #[test]
    fn test_short_reads_counted_not_selected() -> Result<()> {
        let mut reads = stream(b">short\nAC\n>long\nACGTAC\n");
        let mut out = Vec::new();
        let mut engine = exact_engine(3, 0.0);

        let summary = run_single(&mut reads, &mut out, &mut engine, None, &hidden_spinner())?;

        assert_eq!((summary.processed, summary.selected, summary.degenerate), (2, 1, 1));
        assert_eq!(summary.mean_score(1), 1.0);
        assert_eq!(out, b">long\nACGTAC\n");
        Ok(())
    }

    #[test]
    fn test_max_records_stops_early() -> Result<()> {
        let mut reads = stream(b">r1\nACGTAC\n>r2\nTTGCAA\n>r3\nGGGCCC\n");
        let mut out = Vec::new();
        let mut engine = exact_engine(3, 0.0);

        let summary = run_single(&mut reads, &mut out, &mut engine, Some(2), &hidden_spinner())?;

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.selected, 2);
        assert_eq!(summary.selected_percent(), 100.0);
        Ok(())
    }

    #[test]
    fn test_decode_error_is_fatal() {
        let mut reads = stream(b"@r1\nACGTAC\n+\nIIIIII\n@r2\nACGT\n+\nII\n");
        let mut out = Vec::new();
        let mut engine = exact_engine(3, 0.0);

        let result = run_single(&mut reads, &mut out, &mut engine, None, &hidden_spinner());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_input() -> Result<()> {
        let mut reads = stream(b"");
        let mut out = Vec::new();
        let mut engine = ScoreEngine::<HllSketch>::new(&RunConfig::default())?;

        let summary = run_single(&mut reads, &mut out, &mut engine, None, &hidden_spinner())?;
        assert_eq!(summary, RunSummary::default());
        assert_eq!(summary.selected_percent(), 0.0);
        assert_eq!(summary.mean_score(1), 0.0);
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn test_paired_rules() -> Result<()> {
        // second mate of pair 2 repeats pair 1
        let r1: &'static [u8] = b">p1/1\nACGTAC\n>p2/1\nTTGCAA\n";
        let r2: &'static [u8] = b">p1/2\nGGGCCC\n>p2/2\nGGGCCC\n";

        for (rule, expected) in [(PairRule::All, 1), (PairRule::Any, 2)] {
            let (mut reads1, mut reads2) = (stream(r1), stream(r2));
            let (mut out1, mut out2) = (Vec::new(), Vec::new());
            let (mut engine1, mut engine2) = (exact_engine(3, 0.2), exact_engine(3, 0.2));

            let summary = run_paired(
                (&mut reads1, &mut reads2),
                PairedWriters { first: &mut out1, second: &mut out2 },
                (&mut engine1, &mut engine2),
                rule,
                None,
                &hidden_spinner(),
            )?;

            assert_eq!(summary.processed, 2);
            assert_eq!(summary.selected, expected);
            assert_eq!(out1.iter().filter(|&&b| b == b'>').count() as u64, expected);
            assert_eq!(out2.iter().filter(|&&b| b == b'>').count() as u64, expected);
        }
        Ok(())
    }

    #[test]
    fn test_paired_length_mismatch() {
        let (mut reads1, mut reads2) = (stream(b">a\nACGTAC\n>b\nACGTAC\n"), stream(b">a\nACGTAC\n"));
        let (mut out1, mut out2) = (Vec::new(), Vec::new());
        let (mut engine1, mut engine2) = (exact_engine(3, 0.2), exact_engine(3, 0.2));

        let result = run_paired(
            (&mut reads1, &mut reads2),
            PairedWriters { first: &mut out1, second: &mut out2 },
            (&mut engine1, &mut engine2),
            PairRule::All,
            None,
            &hidden_spinner(),
        );
        assert!(result.is_err());
    }
}
