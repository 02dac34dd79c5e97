//! Chain optimizer
//!
//! Finds the parenthesization of a matrix chain with the fewest scalar
//! multiplies, using the textbook O(n³) dynamic program over chain length.
//! The O(n log n) Hu–Shing algorithm is not used: chains are short in
//! practice and the cubic table is exact and simple to audit.

use log::{debug, trace};

use super::options::ProductOptions;
use super::split_tree::SplitTree;
use super::table::{CostTable, Entry};
use crate::error::{Axis, ProductError, Result};
use crate::{Dense, Matrix};

/// Fill a cost table for the chain described by `dims`
///
/// Factor `i` is `dims[i] × dims[i + 1]`, so `dims.len()` is one more than
/// the number of factors. Ties keep the lowest split index. Costs saturate
/// at `usize::MAX` rather than overflow.
pub fn optimize_dims(dims: &[usize]) -> CostTable {
    let n = dims.len().saturating_sub(1);
    let mut table = CostTable::new(n);

    // Subchains are resolved shortest first, so table[i][k] and
    // table[k+1][j] are final before table[i][j] reads them.
    for f in 1..n {
        for i in 0..n - f {
            let j = i + f;
            let mut best = Entry {
                cost: usize::MAX,
                split: i,
            };
            for k in i..j {
                let cost = table
                    .at(i, k)
                    .cost
                    .saturating_add(table.at(k + 1, j).cost)
                    .saturating_add(
                        dims[i]
                            .saturating_mul(dims[k + 1])
                            .saturating_mul(dims[j + 1]),
                    );
                if cost < best.cost {
                    best = Entry { cost, split: k };
                }
            }
            table.set(i, j, best);
        }
    }
    table
}

/// Operation-order optimizer for one product call
pub struct ChainOptimizer<'a> {
    /// Ordered factors to multiply
    factors: &'a [&'a dyn Matrix],

    /// Factor `i` is `dims[i] × dims[i + 1]`
    dims: Vec<usize>,

    /// Costs and split indices, filled by `optimize`
    table: CostTable,

    options: ProductOptions,
}

impl<'a> ChainOptimizer<'a> {
    /// Validate shapes and derive the dimension chain
    ///
    /// A non-empty `dst` must match the outer dimensions of the chain.
    /// Every adjacent pair must agree on its inner dimension. Nothing is
    /// allocated for `dst` here.
    pub fn new(
        dst: &Dense,
        factors: &'a [&'a dyn Matrix],
        options: ProductOptions,
    ) -> Result<Self> {
        let (r, c) = dst.dims();
        let (first, last) = match (factors.first(), factors.last()) {
            (Some(first), Some(last)) => (first.dims(), last.dims()),
            _ => return Err(ProductError::EmptyChain { rows: r, cols: c }),
        };

        if !dst.is_empty() {
            if first.0 != r {
                return Err(ProductError::shape(Axis::DestinationRows, r, first.0));
            }
            if last.1 != c {
                return Err(ProductError::shape(Axis::DestinationCols, c, last.1));
            }
        }

        let mut dims = Vec::with_capacity(factors.len() + 1);
        dims.push(first.0);
        let mut prev_cols = first.1;
        for (i, f) in factors.iter().enumerate().skip(1) {
            let (fr, fc) = f.dims();
            if fr != prev_cols {
                return Err(ProductError::shape(Axis::Inner { left: i - 1 }, prev_cols, fr));
            }
            dims.push(fr);
            prev_cols = fc;
        }
        dims.push(prev_cols);

        Ok(ChainOptimizer {
            factors,
            dims,
            table: CostTable::new(factors.len()),
            options,
        })
    }

    /// Determine an optimal multiplication order
    pub fn optimize(&mut self) {
        if self.options.tracing() {
            debug!("chain dims: {:?}", self.dims);
        }
        self.table = optimize_dims(&self.dims);
        if self.options.tracing() {
            let n = self.factors.len();
            for f in 1..n {
                for i in 0..n - f {
                    let e = self.table.at(i, i + f);
                    trace!("\tcost[{}][{}] = {} split at {}", i, i + f, e.cost, e.split);
                }
            }
            debug!("\tplan {} cost={}", self.split_tree(), self.cost());
        }
    }

    pub fn factors(&self) -> &'a [&'a dyn Matrix] {
        self.factors
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn table(&self) -> &CostTable {
        &self.table
    }

    pub fn options(&self) -> ProductOptions {
        self.options
    }

    /// Minimal scalar multiplies for the whole chain
    pub fn cost(&self) -> usize {
        self.table.at(0, self.factors.len() - 1).cost
    }

    /// The optimal parenthesization as an explicit tree
    pub fn split_tree(&self) -> SplitTree {
        SplitTree::from_table(&self.table, self.factors.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeros(shapes: &[(usize, usize)]) -> Vec<Dense> {
        shapes.iter().map(|&(r, c)| Dense::zeros(r, c)).collect()
    }

    fn refs(ms: &[Dense]) -> Vec<&dyn Matrix> {
        ms.iter().map(|m| m as &dyn Matrix).collect()
    }

    #[test]
    fn test_three_factor_textbook_example() {
        // A(10×100) B(100×5) C(5×50): (AB)C = 7500, A(BC) = 75000
        let table = optimize_dims(&[10, 100, 5, 50]);

        assert_eq!(table.at(0, 2).cost, 7500);
        assert_eq!(table.at(0, 2).split, 1);
        assert_eq!(table.at(0, 1).cost, 5000);
        assert_eq!(table.at(1, 2).cost, 25000);
    }

    #[test]
    fn test_six_factor_textbook_example() {
        let table = optimize_dims(&[30, 35, 15, 5, 10, 20, 25]);

        assert_eq!(table.at(0, 5).cost, 15125);
        assert_eq!(table.at(0, 5).split, 2);
        assert_eq!(table.at(0, 2).split, 0);
        assert_eq!(table.at(3, 5).split, 4);
    }

    #[test]
    fn test_ties_keep_lowest_split() {
        let table = optimize_dims(&[2, 2, 2, 2]);
        assert_eq!(table.at(0, 2).split, 0);
    }

    #[test]
    fn test_saturates_instead_of_overflowing() {
        let big = usize::MAX / 2;
        let table = optimize_dims(&[big, big, big, big]);
        assert_eq!(table.at(0, 2).cost, usize::MAX);
    }

    #[test]
    fn test_new_derives_dims_from_factors() {
        let ms = zeros(&[(10, 100), (100, 5), (5, 50)]);
        let factors = refs(&ms);
        let mut opt =
            ChainOptimizer::new(&Dense::empty(), &factors, ProductOptions::default()).unwrap();

        assert_eq!(opt.dims(), &[10, 100, 5, 50]);
        opt.optimize();
        assert_eq!(opt.cost(), 7500);
        assert_eq!(opt.split_tree().to_string(), "((0 1) 2)");
    }

    #[test]
    fn test_inner_mismatch_fails_before_work() {
        let ms = zeros(&[(2, 3), (4, 2), (2, 2)]);
        let factors = refs(&ms);

        let err = ChainOptimizer::new(&Dense::empty(), &factors, ProductOptions::default())
            .err()
            .unwrap();
        assert_eq!(err, ProductError::shape(Axis::Inner { left: 0 }, 3, 4));
    }

    #[test]
    fn test_late_inner_mismatch_names_position() {
        let ms = zeros(&[(2, 3), (3, 4), (4, 5), (6, 1)]);
        let factors = refs(&ms);

        let err = ChainOptimizer::new(&Dense::empty(), &factors, ProductOptions::default())
            .err()
            .unwrap();
        assert_eq!(err, ProductError::shape(Axis::Inner { left: 2 }, 5, 6));
    }

    #[test]
    fn test_presized_destination_checked() {
        let ms = zeros(&[(2, 3), (3, 4), (4, 5)]);
        let factors = refs(&ms);

        let rows = ChainOptimizer::new(&Dense::zeros(3, 5), &factors, ProductOptions::default());
        assert_eq!(rows.err(), Some(ProductError::shape(Axis::DestinationRows, 3, 2)));

        let cols = ChainOptimizer::new(&Dense::zeros(2, 4), &factors, ProductOptions::default());
        assert_eq!(cols.err(), Some(ProductError::shape(Axis::DestinationCols, 4, 5)));

        let fits = ChainOptimizer::new(&Dense::zeros(2, 5), &factors, ProductOptions::default());
        assert!(fits.is_ok());
    }

    #[test]
    fn test_no_factors() {
        let factors: Vec<&dyn Matrix> = Vec::new();
        let err = ChainOptimizer::new(&Dense::empty(), &factors, ProductOptions::default())
            .err()
            .unwrap();
        assert!(err.is_shape());
    }
}
