//! Scratch allocator for chain products
//!
//! Reusable matrix storage so intermediate products of a chain stop
//! allocating after warmup.

use std::sync::{Arc, Mutex, PoisonError};

use crate::Dense;

/// Lends and reclaims matrix buffers
///
/// `release` takes the buffer by value: once returned it cannot be read
/// or returned again.
pub trait Pool {
    /// Borrow a `rows×cols` buffer; contents are zero only if `clear`
    fn acquire(&mut self, rows: usize, cols: usize, clear: bool) -> Dense;

    /// Give a buffer back
    fn release(&mut self, m: Dense);
}

/// Reusable buffer pool for chain products
///
/// Usage pattern:
/// ```
/// use matchain::{Pool, Scratch};
///
/// let mut scratch = Scratch::new();
///
/// // First call allocates
/// let buf1 = scratch.acquire(10, 10, true);
///
/// // Return when done
/// scratch.release(buf1);
///
/// // Second call reuses (zero allocation!)
/// let buf2 = scratch.acquire(5, 20, false);
/// assert_eq!(scratch.stats().allocated, 1);
/// # scratch.release(buf2);
/// ```
#[derive(Debug, Default)]
pub struct Scratch {
    bufs: Vec<Vec<f64>>,
    acquired: usize,
    released: usize,
    allocated: usize,
}

impl Scratch {
    /// Create new scratch allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the smallest parked buffer that can hold `len` values
    fn take_fitting(&mut self, len: usize) -> Option<Vec<f64>> {
        let idx = self
            .bufs
            .iter()
            .enumerate()
            .filter(|(_, b)| b.capacity() >= len)
            .min_by_key(|(_, b)| b.capacity())
            .map(|(i, _)| i)?;
        Some(self.bufs.swap_remove(idx))
    }

    /// Clear all buffers (free memory)
    pub fn clear(&mut self) {
        self.bufs.clear();
    }

    /// Get statistics
    pub fn stats(&self) -> ScratchStats {
        ScratchStats {
            pooled: self.bufs.len(),
            acquired: self.acquired,
            released: self.released,
            allocated: self.allocated,
        }
    }

    /// Buffers currently on loan
    ///
    /// Buffers released without being acquired here (seeding the pool)
    /// do not count against loans.
    pub fn outstanding(&self) -> usize {
        self.acquired.saturating_sub(self.released)
    }
}

impl Pool for Scratch {
    fn acquire(&mut self, rows: usize, cols: usize, clear: bool) -> Dense {
        let len = rows * cols;
        self.acquired += 1;

        let buf = match self.take_fitting(len) {
            Some(mut buf) => {
                if clear {
                    buf.clear();
                } else {
                    // Stale values stay; the caller overwrites them.
                    buf.truncate(len);
                }
                buf
            }
            None => {
                self.allocated += 1;
                Vec::with_capacity(len)
            }
        };
        Dense::from_raw(rows, cols, buf)
    }

    fn release(&mut self, m: Dense) {
        self.released += 1;
        self.bufs.push(m.into_raw());
    }
}

/// Scratch allocator statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScratchStats {
    /// Buffers parked in the pool
    pub pooled: usize,
    /// Total `acquire` calls
    pub acquired: usize,
    /// Total `release` calls
    pub released: usize,
    /// Acquisitions that needed fresh storage
    pub allocated: usize,
}

/// Thread-safe handle onto a shared [`Scratch`]
///
/// Clone one handle per thread; every clone lends from the same buffers.
#[derive(Clone, Debug, Default)]
pub struct SharedScratch {
    inner: Arc<Mutex<Scratch>>,
}

impl SharedScratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ScratchStats {
        self.lock().stats()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Scratch> {
        // Scratch has no invariant a panicking holder could break.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Pool for SharedScratch {
    fn acquire(&mut self, rows: usize, cols: usize, clear: bool) -> Dense {
        self.lock().acquire(rows, cols, clear)
    }

    fn release(&mut self, m: Dense) {
        self.lock().release(m);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Matrix;

    #[test]
    fn test_scratch_reuse() {
        let mut scratch = Scratch::new();

        // First allocation
        let buf1 = scratch.acquire(10, 10, true);
        assert_eq!(buf1.dims(), (10, 10));

        // Return to pool
        scratch.release(buf1);
        assert_eq!(scratch.stats().pooled, 1);

        // Second allocation reuses (no new allocation)
        let buf2 = scratch.acquire(10, 10, true);
        assert_eq!(buf2.dims(), (10, 10));
        assert_eq!(scratch.stats().pooled, 0); // Buffer taken from pool
        assert_eq!(scratch.stats().allocated, 1);
    }

    #[test]
    fn test_scratch_grows_when_too_small() {
        let mut scratch = Scratch::new();

        let small = scratch.acquire(2, 2, true);
        scratch.release(small);

        // Parked buffer cannot hold 100 values, so a fresh one is made
        let big = scratch.acquire(10, 10, true);
        assert_eq!(big.as_slice().len(), 100);
        assert_eq!(scratch.stats().allocated, 2);
        assert_eq!(scratch.stats().pooled, 1);
    }

    #[test]
    fn test_scratch_best_fit() {
        let mut scratch = Scratch::new();
        let big = scratch.acquire(10, 10, true);
        let small = scratch.acquire(3, 3, true);
        scratch.release(big);
        scratch.release(small);

        let m = scratch.acquire(2, 4, true);
        assert!(m.into_raw().capacity() < 100);
    }

    #[test]
    fn test_clear_flag_zeroes() {
        let mut scratch = Scratch::new();
        let mut m = scratch.acquire(2, 2, true);
        m.as_mut_slice().fill(7.0);
        scratch.release(m);

        let m = scratch.acquire(2, 2, true);
        assert_eq!(m.as_slice(), &[0.0; 4]);
    }

    #[test]
    fn test_outstanding_tracks_loans() {
        let mut scratch = Scratch::new();
        let a = scratch.acquire(1, 1, false);
        let b = scratch.acquire(1, 1, false);
        assert_eq!(scratch.outstanding(), 2);

        scratch.release(a);
        scratch.release(b);
        assert_eq!(scratch.outstanding(), 0);
    }

    #[test]
    fn test_seeded_buffer_is_not_a_loan() {
        let mut scratch = Scratch::new();

        // Seed the pool with storage it never lent out
        scratch.release(Dense::zeros(2, 2));
        assert_eq!(scratch.outstanding(), 0);
        assert_eq!(scratch.stats().pooled, 1);

        let m = scratch.acquire(2, 2, true);
        assert_eq!(scratch.stats().allocated, 0); // Seeded buffer reused
        scratch.release(m);
        assert_eq!(scratch.outstanding(), 0);
    }

    #[test]
    fn test_scratch_clear() {
        let mut scratch = Scratch::new();

        let m = scratch.acquire(4, 4, false);
        scratch.release(m);
        assert_eq!(scratch.stats().pooled, 1);

        scratch.clear();
        assert_eq!(scratch.stats().pooled, 0);
    }

    #[test]
    fn test_shared_scratch_across_threads() {
        let pool = SharedScratch::new();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mut pool = pool.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        let m = pool.acquire(3, 3, true);
                        pool.release(m);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let stats = pool.stats();
        assert_eq!(stats.acquired, 40);
        assert_eq!(stats.released, 40);
        assert!(stats.allocated <= 4);
    }
}
