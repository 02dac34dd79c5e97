//! matchain: optimally ordered matrix chain products
//!
//! Picks the multiplication order with the fewest scalar multiplies and
//! evaluates it with pooled scratch buffers, so long chains allocate ~0
//! after warmup.

pub mod builtins;
pub mod chain;
pub mod error;
pub mod matrix;

pub use builtins::{Pool, Scratch, ScratchStats, SharedScratch};
pub use chain::{
    left_to_right, optimize_dims, ChainOptimizer, CostTable, Entry, ExecutionStats, Executor,
    ProductOptions, SplitTree, Verbosity,
};
pub use error::{Axis, ProductError, Result};
pub use matrix::{Dense, Matrix};
