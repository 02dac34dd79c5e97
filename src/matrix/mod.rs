//! Matrix storage and the read-only operand capability

pub mod dense;

pub use dense::Dense;

/// Read-only matrix operand
///
/// Anything that reports its shape and element values can take part in a
/// chain product. Implementors backed by contiguous row-major storage
/// should return themselves from [`Matrix::as_dense`] to reach the slice
/// kernels.
pub trait Matrix {
    /// `(rows, cols)`
    fn dims(&self) -> (usize, usize);

    /// Element at row `i`, column `j`
    fn at(&self, i: usize, j: usize) -> f64;

    /// Contiguous row-major view; `Some` lets kernels skip per-element `at`
    fn as_dense(&self) -> Option<&Dense> {
        None
    }
}
