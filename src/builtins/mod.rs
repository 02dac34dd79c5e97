//! Built-in kernels and scratch storage

pub mod kernels;
pub mod scratch;

pub use scratch::{Pool, Scratch, ScratchStats, SharedScratch};
