//! Error types for chain products.

use std::fmt;
use thiserror::Error;

/// Result type for chain operations.
pub type Result<T, E = ProductError> = std::result::Result<T, E>;

/// Which dimension a shape error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Row count of a pre-sized destination vs the first factor.
    DestinationRows,
    /// Column count of a pre-sized destination vs the last factor.
    DestinationCols,
    /// Columns of factor `left` vs rows of factor `left + 1`.
    Inner { left: usize },
    /// Row count of a non-empty receiver being reused.
    ReuseRows,
    /// Column count of a non-empty receiver being reused.
    ReuseCols,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::DestinationRows => write!(f, "destination rows"),
            Axis::DestinationCols => write!(f, "destination columns"),
            Axis::Inner { left } => {
                write!(f, "inner dimension between factors {} and {}", left, left + 1)
            }
            Axis::ReuseRows => write!(f, "receiver rows"),
            Axis::ReuseCols => write!(f, "receiver columns"),
        }
    }
}

/// Errors raised by [`Dense::product`](crate::Dense::product) and friends.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// Operand shapes are inconsistent (caller misuse).
    #[error("shape mismatch in {axis}: expected {expected}, found {found}")]
    Shape {
        axis: Axis,
        expected: usize,
        found: usize,
    },

    /// A product of zero factors was asked to fill a non-empty destination.
    #[error("empty chain cannot fill a non-empty {rows}×{cols} destination")]
    EmptyChain { rows: usize, cols: usize },

    /// The executor found a state the optimizer should have ruled out.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl ProductError {
    pub(crate) fn shape(axis: Axis, expected: usize, found: usize) -> Self {
        ProductError::Shape {
            axis,
            expected,
            found,
        }
    }

    /// True for errors caused by inconsistent input shapes.
    pub fn is_shape(&self) -> bool {
        matches!(self, ProductError::Shape { .. } | ProductError::EmptyChain { .. })
    }

    /// True for errors that indicate a defect in this crate.
    pub fn is_internal(&self) -> bool {
        matches!(self, ProductError::Invariant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes_are_disjoint() {
        let shape = ProductError::shape(Axis::Inner { left: 0 }, 3, 4);
        let empty = ProductError::EmptyChain { rows: 2, cols: 2 };
        let internal = ProductError::Invariant("stack".to_string());

        assert!(shape.is_shape() && !shape.is_internal());
        assert!(empty.is_shape() && !empty.is_internal());
        assert!(internal.is_internal() && !internal.is_shape());
    }

    #[test]
    fn test_shape_message_names_both_factors() {
        let err = ProductError::shape(Axis::Inner { left: 2 }, 5, 7);
        assert_eq!(
            err.to_string(),
            "shape mismatch in inner dimension between factors 2 and 3: expected 5, found 7"
        );
    }
}
