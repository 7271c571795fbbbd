//! This module defines the `RunConfig` struct, which holds the scoring parameters
//! fixed for the lifetime of a run: platter count, sketch precision (cups), k-mer
//! length, acceptance threshold and momentum. Raw user values are never rejected;
//! they are clamped into range and every adjustment is reported as a `ClampWarning`.

use std::fmt;

pub const DEFAULT_PLATTERS: usize = 10;
pub const DEFAULT_CUPS: u8 = 8;
pub const DEFAULT_KMER_LENGTH: usize = 23;
pub const DEFAULT_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MOMENTUM: f64 = 1e-6;

pub const PLATTER_RANGE: (usize, usize) = (1, 50);
pub const CUPS_RANGE: (u8, u8) = (4, 16);
pub const KMER_LENGTH_RANGE: (usize, usize) = (1, 100);
pub const THRESHOLD_RANGE: (f64, f64) = (0.0, 1.0);
pub const MOMENTUM_RANGE: (f64, f64) = (0.0, 0.001);

/// Parameter values as given by the user, before clamping.
#[derive(Clone, Debug, PartialEq)]
pub struct RawParams {
    pub platters: i64,
    pub cups: i64,
    pub kmer_length: i64,
    pub threshold: f64,
    pub momentum: f64,
}

impl Default for RawParams {
    fn default() -> Self {
        RawParams {
            platters: DEFAULT_PLATTERS as i64,
            cups: DEFAULT_CUPS as i64,
            kmer_length: DEFAULT_KMER_LENGTH as i64,
            threshold: DEFAULT_THRESHOLD,
            momentum: DEFAULT_MOMENTUM,
        }
    }
}

/// A parameter that was moved into its valid range.
#[derive(Clone, Debug, PartialEq)]
pub struct ClampWarning {
    pub parameter: &'static str,
    pub given: String,
    pub used: String,
}

impl fmt::Display for ClampWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is out of range; using {} instead",
            self.parameter, self.given, self.used
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    platters: usize,
    cups: u8,
    kmer_length: usize,
    threshold: f64,
    momentum: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            platters: DEFAULT_PLATTERS,
            cups: DEFAULT_CUPS,
            kmer_length: DEFAULT_KMER_LENGTH,
            threshold: DEFAULT_THRESHOLD,
            momentum: DEFAULT_MOMENTUM,
        }
    }
}

impl RunConfig {
    /// Clamp raw parameters into their valid ranges.
    ///
    /// Cups below the minimum fall back to the default precision rather than
    /// the lower bound; all other parameters move to the nearest bound.
    pub fn clamped(raw: &RawParams) -> (Self, Vec<ClampWarning>) {
        let mut warnings = Vec::new();

        let platters = clamp_int(raw.platters, PLATTER_RANGE.0 as i64, PLATTER_RANGE.1 as i64);
        if platters != raw.platters {
            warnings.push(warning("platters", raw.platters, platters));
        }

        let cups = if raw.cups > i64::from(CUPS_RANGE.1) {
            i64::from(CUPS_RANGE.1)
        } else if raw.cups < i64::from(CUPS_RANGE.0) {
            i64::from(DEFAULT_CUPS)
        } else {
            raw.cups
        };
        if cups != raw.cups {
            warnings.push(warning("cups", raw.cups, cups));
        }

        let kmer_length = clamp_int(raw.kmer_length, KMER_LENGTH_RANGE.0 as i64, KMER_LENGTH_RANGE.1 as i64);
        if kmer_length != raw.kmer_length {
            warnings.push(warning("kmer_length", raw.kmer_length, kmer_length));
        }

        let threshold = clamp_float(raw.threshold, THRESHOLD_RANGE, DEFAULT_THRESHOLD);
        if threshold != raw.threshold {
            warnings.push(warning("threshold", raw.threshold, threshold));
        }

        let momentum = clamp_float(raw.momentum, MOMENTUM_RANGE, DEFAULT_MOMENTUM);
        if momentum != raw.momentum {
            warnings.push(warning("momentum", raw.momentum, momentum));
        }

        let config = RunConfig {
            platters: platters as usize,
            cups: cups as u8,
            kmer_length: kmer_length as usize,
            threshold,
            momentum,
        };

        (config, warnings)
    }

    pub fn platters(&self) -> usize {
        self.platters
    }

    pub fn cups(&self) -> u8 {
        self.cups
    }

    pub fn k(&self) -> usize {
        self.kmer_length
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }
}

fn clamp_int(value: i64, min: i64, max: i64) -> i64 {
    value.clamp(min, max)
}

// NaN never compares in range, so it takes the default.
fn clamp_float(value: f64, range: (f64, f64), default: f64) -> f64 {
    if value.is_nan() {
        default
    } else {
        value.clamp(range.0, range.1)
    }
}

fn warning<T: fmt::Display, U: fmt::Display>(parameter: &'static str, given: T, used: U) -> ClampWarning {
    ClampWarning {
        parameter,
        given: given.to_string(),
        used: used.to_string(),
    }
}
