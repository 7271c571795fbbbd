//! This module implements the uniqueness scoring of reads against a stream of
//! previously seen reads.
//!
//! Each read's k-mers are spread over `P` platters, each backed by its own cardinality
//! sketch. The change in every platter's estimate, corrected for short reads and a small
//! momentum term, is averaged (weighted by the platter's current cardinality) into a
//! score. A read is accepted when its score is strictly greater than the threshold.
//!
//! Scoring is order-sensitive: the state left by read `n` feeds the score of read `n + 1`,
//! so reads must be scored one at a time in stream order.

use anyhow::Result;
use itertools::izip;

use crate::partition::{Degenerate, Partition};
use crate::run_config::RunConfig;
use crate::sketch::{CardinalitySketch, HllSketch, PlatterSketchArray};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn is_accept(self) -> bool {
        self == Decision::Accept
    }
}

/// Result of scoring a single read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreOutcome {
    /// 1-based position of the read in the stream.
    pub record_index: u64,
    pub score: f64,
    pub decision: Decision,
    pub degenerate: Option<Degenerate>,
}

pub struct ScoreEngine<S = HllSketch> {
    config: RunConfig,
    sketches: PlatterSketchArray<S>,
    record_index: u64,
    max_chunk_size: usize,
    prev_estimates: Vec<u64>,
    curr_estimates: Vec<u64>,
    running_avg: Vec<f64>,
}

impl<S: CardinalitySketch> ScoreEngine<S> {
    pub fn new(config: &RunConfig) -> Result<Self> {
        let platters = config.platters();
        let sketches = PlatterSketchArray::new(platters, config.cups())?;

        Ok(ScoreEngine {
            config: config.clone(),
            sketches,
            record_index: 1,
            max_chunk_size: 0,
            prev_estimates: vec![0; platters],
            curr_estimates: vec![0; platters],
            running_avg: vec![0.0; platters],
        })
    }

    pub fn platters(&self) -> usize {
        self.sketches.len()
    }

    /// Score `seq` against all reads seen so far and decide whether to keep it.
    pub fn score(&mut self, seq: &[u8]) -> ScoreOutcome {
        let record_index = self.record_index;
        self.record_index += 1;

        let partition = match Partition::new(seq.len(), self.config.k(), self.platters()) {
            Ok(partition) => partition,
            Err(reason) => {
                return ScoreOutcome {
                    record_index,
                    score: 0.0,
                    decision: Decision::Reject,
                    degenerate: Some(reason),
                };
            }
        };

        let chunk_size = partition.chunk_size();
        let correction = if chunk_size < self.max_chunk_size {
            (self.max_chunk_size - chunk_size) as f64
        } else {
            self.max_chunk_size = chunk_size;
            0.0
        };

        for (platter, kmer) in partition.kmers(seq) {
            self.sketches.add(platter, kmer);
        }
        self.sketches.estimates_into(&mut self.curr_estimates);

        let threshold = self.config.threshold();
        let momentum = self.config.momentum();
        let n = record_index as f64;

        let mut weighted_sum = 0.0;
        let mut curr_sum = 0.0;
        for (&curr, prev, avg) in izip!(&self.curr_estimates, &mut self.prev_estimates, &mut self.running_avg) {
            let diff_count = curr as f64 - *prev as f64;
            let corr_count = diff_count + (1.0 - threshold) * (correction + momentum * *avg + momentum * n);
            *avg = (*avg * (n - 1.0) + corr_count) / n;

            weighted_sum += corr_count / chunk_size as f64 * curr as f64;
            curr_sum += curr as f64;
            *prev = curr;
        }

        let score = if curr_sum > 0.0 { weighted_sum / curr_sum } else { 0.0 };
        let decision = if score > threshold { Decision::Accept } else { Decision::Reject };

        ScoreOutcome {
            record_index,
            score,
            decision,
            degenerate: None,
        }
    }
}
