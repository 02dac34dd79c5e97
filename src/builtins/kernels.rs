//! Pairwise matrix kernels
//!
//! Monomorphic tight loops over row-major slices. Callers check shapes;
//! kernels only `debug_assert` them.

use crate::matrix::Matrix;

/// Row-major multiply: `out (m×n) = a (m×k) · b (k×n)`
///
/// i-k-j order keeps the inner loop contiguous in both `b` and `out`.
/// Every element of `out` is written, so stale buffer contents are fine.
#[inline(always)]
pub fn gemm(a: &[f64], b: &[f64], out: &mut [f64], m: usize, k: usize, n: usize) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(out.len(), m * n);

    if n == 0 {
        return;
    }

    for (i, out_row) in out.chunks_exact_mut(n).enumerate() {
        out_row.fill(0.0);
        let a_row = &a[i * k..(i + 1) * k];
        for (p, &aip) in a_row.iter().enumerate() {
            let b_row = &b[p * n..(p + 1) * n];
            for (o, &bpj) in out_row.iter_mut().zip(b_row) {
                *o += aip * bpj;
            }
        }
    }
}

/// Multiply operands that only expose element access
pub fn gemm_generic(a: &dyn Matrix, b: &dyn Matrix, out: &mut [f64]) {
    let (m, k) = a.dims();
    let (_, n) = b.dims();
    debug_assert_eq!(out.len(), m * n);

    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0;
            for p in 0..k {
                sum += a.at(i, p) * b.at(p, j);
            }
            out[i * n + j] = sum;
        }
    }
}

/// Copy the overlapping `rows×cols` block of `src` into `dst` (row stride `dst_cols`)
pub fn copy_block(src: &dyn Matrix, dst: &mut [f64], dst_cols: usize, rows: usize, cols: usize) {
    if let Some(dense) = src.as_dense() {
        let src_cols = dense.dims().1;
        let data = dense.as_slice();
        for i in 0..rows {
            dst[i * dst_cols..i * dst_cols + cols]
                .copy_from_slice(&data[i * src_cols..i * src_cols + cols]);
        }
        return;
    }
    for i in 0..rows {
        for j in 0..cols {
            dst[i * dst_cols + j] = src.at(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dense;

    #[test]
    fn test_gemm_small() {
        // [1 2 3]   [7  8 ]   [ 58  64]
        // [4 5 6] · [9  10] = [139 154]
        //           [11 12]
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut out = [f64::NAN; 4];

        gemm(&a, &b, &mut out, 2, 3, 2);

        assert_eq!(out, [58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_gemm_zero_inner_dimension_zeroes_output() {
        let mut out = [5.0; 6];
        gemm(&[], &[], &mut out, 2, 0, 3);
        assert_eq!(out, [0.0; 6]);
    }

    #[test]
    fn test_generic_matches_slice_kernel() {
        let a = Dense::new(2, 3, vec![1.0, -2.0, 0.5, 3.0, 1.0, -1.0]);
        let b = Dense::new(3, 2, vec![2.0, 1.0, 0.0, -1.0, 4.0, 2.0]);

        let mut fast = vec![0.0; 4];
        gemm(a.as_slice(), b.as_slice(), &mut fast, 2, 3, 2);
        let mut slow = vec![0.0; 4];
        gemm_generic(&a, &b, &mut slow);

        assert_eq!(fast, slow);
    }

    #[test]
    fn test_copy_block_overlap() {
        let src = Dense::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut dst = vec![0.0; 4];

        copy_block(&src, &mut dst, 2, 2, 2);

        assert_eq!(dst, vec![1.0, 2.0, 4.0, 5.0]);
    }
}
