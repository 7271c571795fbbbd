//! Per-platter cardinality sketches.
//!
//! `CardinalitySketch` is the seam to the approximate distinct-count primitive. The
//! production implementation is HyperLogLog++ from the `hyperloglogplus` crate, hashed
//! with a fixed-seed `wyhash` so that repeated runs over the same input agree.
//! `PlatterSketchArray` owns one sketch per platter for the lifetime of a run.

use std::hash::BuildHasherDefault;

use anyhow::{Result, anyhow};
use hyperloglogplus::{HyperLogLog, HyperLogLogPlus};
use wyhash::WyHash;

/// Approximate distinct-count structure over byte strings.
pub trait CardinalitySketch: Sized {
    /// Create an empty sketch with `2^cups` registers.
    fn with_precision(cups: u8) -> Result<Self>;

    fn add(&mut self, item: &[u8]);

    /// Current distinct-count estimate. Not guaranteed to be monotonic.
    fn estimate(&mut self) -> u64;
}

pub struct HllSketch {
    hll: HyperLogLogPlus<[u8], BuildHasherDefault<WyHash>>,
}

impl CardinalitySketch for HllSketch {
    fn with_precision(cups: u8) -> Result<Self> {
        let hll = HyperLogLogPlus::new(cups, BuildHasherDefault::<WyHash>::default())
            .map_err(|e| anyhow!("Failed to create sketch with {} cups: {:?}", cups, e))?;

        Ok(HllSketch { hll })
    }

    #[inline]
    fn add(&mut self, item: &[u8]) {
        self.hll.insert(item);
    }

    fn estimate(&mut self) -> u64 {
        let count = self.hll.count();
        if count.is_finite() && count > 0.0 {
            count.round() as u64
        } else {
            0
        }
    }
}

/// One independent sketch per platter, addressed by platter index.
pub struct PlatterSketchArray<S = HllSketch> {
    sketches: Vec<S>,
}

impl<S: CardinalitySketch> PlatterSketchArray<S> {
    pub fn new(platters: usize, cups: u8) -> Result<Self> {
        let sketches = (0..platters)
            .map(|_| S::with_precision(cups))
            .collect::<Result<Vec<S>>>()?;

        Ok(PlatterSketchArray { sketches })
    }

    pub fn len(&self) -> usize {
        self.sketches.len()
    }

    #[inline]
    pub fn add(&mut self, platter: usize, item: &[u8]) {
        self.sketches[platter].add(item);
    }

    pub fn estimate(&mut self, platter: usize) -> u64 {
        self.sketches[platter].estimate()
    }

    /// Fill `out` with the current estimate of every platter.
    pub fn estimates_into(&mut self, out: &mut [u64]) {
        for (platter, estimate) in out.iter_mut().enumerate() {
            *estimate = self.estimate(platter);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Exact distinct counter used to make scoring tests deterministic.
    #[derive(Default)]
    pub(crate) struct ExactSketch {
        items: HashSet<Vec<u8>>,
    }

    impl CardinalitySketch for ExactSketch {
        fn with_precision(_cups: u8) -> Result<Self> {
            Ok(ExactSketch::default())
        }

        fn add(&mut self, item: &[u8]) {
            if !self.items.contains(item) {
                self.items.insert(item.to_vec());
            }
        }

        fn estimate(&mut self) -> u64 {
            self.items.len() as u64
        }
    }

    #[test]
    fn test_platter_count() {
        for platters in [1, 7, 50] {
            for cups in [4, 8, 16] {
                let array = PlatterSketchArray::<HllSketch>::new(platters, cups).unwrap();
                assert_eq!(array.len(), platters);
            }
        }
    }

    #[test]
    fn test_platters_are_independent() {
        let mut array = PlatterSketchArray::<HllSketch>::new(3, 8).unwrap();
        array.add(1, b"ACG");
        array.add(1, b"CGT");
        array.add(1, b"ACG");

        assert_eq!(array.estimate(0), 0);
        assert_eq!(array.estimate(1), 2);
        assert_eq!(array.estimate(2), 0);

        let mut estimates = vec![0; 3];
        array.estimates_into(&mut estimates);
        assert_eq!(estimates, vec![0, 2, 0]);
    }

    #[test]
    fn test_hll_small_counts_are_close() {
        let mut sketch = HllSketch::with_precision(8).unwrap();
        for i in 0..500u32 {
            sketch.add(format!("kmer{}", i).as_bytes());
            sketch.add(format!("kmer{}", i).as_bytes());
        }

        let estimate = sketch.estimate() as f64;
        assert!((estimate - 500.0).abs() < 100.0, "estimate {} too far from 500", estimate);
    }

    #[test]
    fn test_hll_is_reproducible() {
        let mut a = HllSketch::with_precision(4).unwrap();
        let mut b = HllSketch::with_precision(4).unwrap();
        for i in 0..10_000u32 {
            a.add(&i.to_le_bytes());
            b.add(&i.to_le_bytes());
        }
        assert_eq!(a.estimate(), b.estimate());
    }
}
