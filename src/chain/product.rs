//! Chain product entry point

use super::executor::Executor;
use super::options::ProductOptions;
use super::planner::ChainOptimizer;
use crate::builtins::scratch::Pool;
use crate::error::{Axis, ProductError, Result};
use crate::{Dense, Matrix};

impl Dense {
    /// Store the product of `factors` in the receiver
    ///
    /// The multiplication order is chosen to minimise scalar multiplies,
    /// treating every pairwise product as a general one. Intermediate
    /// results are borrowed from `pool` and all of them are back in the
    /// pool when this returns, on success or failure.
    ///
    /// An empty receiver is sized to the result; a non-empty one must
    /// already have the result's shape.
    pub fn product<P: Pool + ?Sized>(
        &mut self,
        factors: &[&dyn Matrix],
        pool: &mut P,
    ) -> Result<()> {
        self.product_with(factors, pool, ProductOptions::default())
    }

    /// [`Dense::product`] with explicit options
    pub fn product_with<P: Pool + ?Sized>(
        &mut self,
        factors: &[&dyn Matrix],
        pool: &mut P,
        options: ProductOptions,
    ) -> Result<()> {
        match factors {
            [] => {
                if !self.is_empty() {
                    let (rows, cols) = self.dims();
                    return Err(ProductError::EmptyChain { rows, cols });
                }
                Ok(())
            }
            [only] => {
                let (r, c) = only.dims();
                self.reuse_as(r, c)?;
                self.copy_from(*only);
                Ok(())
            }
            // Two factors have exactly one order.
            [a, b] => self.mul(*a, *b),
            _ => {
                let mut optimizer = ChainOptimizer::new(self, factors, options)?;
                optimizer.optimize();
                let (result, _stats) = Executor::new(&optimizer, pool).multiply()?;

                let (r, c) = result.dims();
                let sized = self.reuse_as(r, c);
                if sized.is_ok() {
                    self.copy_from(&result);
                }
                pool.release(result);
                sized
            }
        }
    }
}

/// Naive sequential product `((f0 · f1) · f2) · …`
///
/// Reference evaluation for checking and benchmarking the optimized path.
pub fn left_to_right(factors: &[&dyn Matrix]) -> Result<Dense> {
    let Some((first, rest)) = factors.split_first() else {
        return Ok(Dense::empty());
    };
    let (r, c) = first.dims();
    let mut acc = Dense::zeros(r, c);
    acc.copy_from(*first);
    for (i, f) in rest.iter().enumerate() {
        let mut next = Dense::empty();
        next.mul(&acc, *f).map_err(|e| match e {
            ProductError::Shape { expected, found, .. } => ProductError::Shape {
                axis: Axis::Inner { left: i },
                expected,
                found,
            },
            other => other,
        })?;
        acc = next;
    }
    Ok(acc)
}
