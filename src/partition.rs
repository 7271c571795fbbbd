//! Splits the k-mer start positions of a read into contiguous chunks, one per platter.
//!
//! For a read of length `L` there are `N = L - k + 1` start positions. Each platter
//! receives a chunk of `nk = N / P` positions; positions past `N - (N mod nk)` are
//! dropped, and any whole chunks beyond the last platter fold into platter `P - 1`.

/// Reason a read yields no platter assignments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Degenerate {
    /// The read is shorter than the k-mer length.
    TooShort,
    /// The read has fewer k-mers than there are platters.
    TooFewKmers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    platters: usize,
    kmer_length: usize,
    chunk_size: usize,
    assigned: usize,
}

impl Partition {
    /// Partition a read of `len` bases into `platters` chunks of k-mers.
    pub fn new(len: usize, kmer_length: usize, platters: usize) -> Result<Self, Degenerate> {
        if len < kmer_length || kmer_length == 0 {
            return Err(Degenerate::TooShort);
        }

        let num_kmers = len - kmer_length + 1;
        let chunk_size = num_kmers / platters.max(1);
        if chunk_size == 0 {
            return Err(Degenerate::TooFewKmers);
        }

        Ok(Partition {
            platters: platters.max(1),
            kmer_length,
            chunk_size,
            assigned: num_kmers - num_kmers % chunk_size,
        })
    }

    /// Number of k-mer positions per chunk (`nk`).
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of positions assigned to any platter (`effk`).
    pub fn assigned(&self) -> usize {
        self.assigned
    }

    /// Platter receiving the k-mer starting at `pos`.
    #[inline]
    pub fn platter_index(&self, pos: usize) -> usize {
        (pos / self.chunk_size).min(self.platters - 1)
    }

    /// Iterate over `(platter, k-mer)` pairs of `seq` in position order.
    pub fn kmers<'a>(&self, seq: &'a [u8]) -> impl Iterator<Item = (usize, &'a [u8])> + use<'a> {
        let part = *self;
        (0..part.assigned).map(move |pos| (part.platter_index(pos), &seq[pos..pos + part.kmer_length]))
    }
}
