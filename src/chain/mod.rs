//! Matrix chain planning and execution
//!
//! A chain product runs in three stages:
//!
//! ```text
//! factors: [A(10×100), B(100×5), C(5×50)]
//!     ↓  ChainOptimizer::new   (shape checks, dims = [10, 100, 5, 50])
//! CostTable                    (O(n³) DP over subchains)
//!     ↓  SplitTree             ((0 1) 2), cost 7500
//! Executor                     (postorder walk, pooled intermediates)
//!     ↓
//! destination ← copy of result, result released to the pool
//! ```
//!
//! Chains of zero, one or two factors skip the optimizer entirely.

pub mod executor;
pub mod options;
pub mod planner;
pub mod product;
pub mod split_tree;
pub mod table;

pub use executor::{ExecutionStats, Executor};
pub use options::{ProductOptions, Verbosity};
pub use planner::{optimize_dims, ChainOptimizer};
pub use product::left_to_right;
pub use split_tree::{Node, NodeId, SplitTree};
pub use table::{CostTable, Entry};
