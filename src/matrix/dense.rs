//! Row-major dense `f64` matrix

use super::Matrix;
use crate::builtins::kernels;
use crate::error::{Axis, ProductError, Result};

/// Row-major dense matrix
///
/// A 0×0 matrix is "empty": it has no shape yet and takes whatever shape
/// the first sizing operation gives it. A non-empty matrix never changes
/// shape implicitly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dense {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Dense {
    /// Create a matrix from row-major data
    ///
    /// Panics if `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), rows * cols, "data length does not match {}×{}", rows, cols);
        Dense { rows, cols, data }
    }

    /// Empty 0×0 matrix
    pub fn empty() -> Self {
        Dense::default()
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Dense::new(rows, cols, vec![0.0; rows * cols])
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Dense::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Build from nested rows; panics on ragged input
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            assert_eq!(row.len(), cols, "ragged rows");
            data.extend_from_slice(row);
        }
        Dense::new(rows.len(), cols, data)
    }

    /// Reassemble a matrix around pooled storage
    ///
    /// `data` is truncated or grown to `rows * cols`. Existing values are
    /// kept, so the contents are unspecified unless the caller zeroes them.
    pub(crate) fn from_raw(rows: usize, cols: usize, mut data: Vec<f64>) -> Self {
        data.resize(rows * cols, 0.0);
        Dense { rows, cols, data }
    }

    /// Hand the backing storage back (pool return path)
    pub(crate) fn into_raw(self) -> Vec<f64> {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 && self.cols == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        assert!(i < self.rows && j < self.cols, "index ({}, {}) out of range", i, j);
        self.data[i * self.cols + j] = v;
    }

    /// Size an empty receiver, or confirm a non-empty one already fits
    pub fn reuse_as(&mut self, rows: usize, cols: usize) -> Result<()> {
        if self.is_empty() {
            self.rows = rows;
            self.cols = cols;
            self.data.clear();
            self.data.resize(rows * cols, 0.0);
            return Ok(());
        }
        if self.rows != rows {
            return Err(ProductError::shape(Axis::ReuseRows, self.rows, rows));
        }
        if self.cols != cols {
            return Err(ProductError::shape(Axis::ReuseCols, self.cols, cols));
        }
        Ok(())
    }

    /// Copy the block shared by `src` and `self`; returns its size
    pub fn copy_from(&mut self, src: &dyn Matrix) -> (usize, usize) {
        let (sr, sc) = src.dims();
        let rows = sr.min(self.rows);
        let cols = sc.min(self.cols);
        kernels::copy_block(src, &mut self.data, self.cols, rows, cols);
        (rows, cols)
    }

    /// Store `a · b` in the receiver
    pub fn mul(&mut self, a: &dyn Matrix, b: &dyn Matrix) -> Result<()> {
        let (ar, ac) = a.dims();
        let (br, bc) = b.dims();
        if ac != br {
            return Err(ProductError::shape(Axis::Inner { left: 0 }, ac, br));
        }
        self.reuse_as(ar, bc)?;

        match (a.as_dense(), b.as_dense()) {
            (Some(a), Some(b)) => kernels::gemm(&a.data, &b.data, &mut self.data, ar, ac, bc),
            _ => kernels::gemm_generic(a, b, &mut self.data),
        }
        Ok(())
    }
}

impl Matrix for Dense {
    fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols, "index ({}, {}) out of range", i, j);
        self.data[i * self.cols + j]
    }

    fn as_dense(&self) -> Option<&Dense> {
        Some(self)
    }
}
