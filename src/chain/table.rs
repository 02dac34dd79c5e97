//! Dynamic programming cost table

/// Best known way to multiply one subchain
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Entry {
    /// Scalar multiplies needed for the subchain
    pub cost: usize,
    /// Split index `k`: the subchain is `[i, k] · [k+1, j]`
    pub split: usize,
}

/// Row-major n×n table over subchains `[i, j]`
///
/// Only `i <= j` is ever addressed. Diagonal entries are never written and
/// keep the default `cost: 0`: a single factor needs no multiplication.
#[derive(Clone, Debug)]
pub struct CostTable {
    n: usize,
    entries: Vec<Entry>,
}

impl CostTable {
    pub fn new(n: usize) -> Self {
        CostTable {
            n,
            entries: vec![Entry::default(); n * n],
        }
    }

    /// Number of factors covered
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize) -> Entry {
        debug_assert!(i <= j && j < self.n);
        self.entries[i * self.n + j]
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize, j: usize, e: Entry) {
        debug_assert!(i <= j && j < self.n);
        self.entries[i * self.n + j] = e;
    }
}
