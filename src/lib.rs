//! Building blocks for nearest neighbor search over nested documents:
//!
//! - [`bitset::FixedBitSet`] maps a child document to its parent document
//! - [`heap::GroupedMaxHeap`] keeps the top-k candidates with at most one
//!   candidate per group
//! - [`search`] combines both into result collectors

pub mod base;
pub mod bitset;
pub mod heap;
pub mod search;

pub use bitset::FixedBitSet;
pub use heap::GroupedMaxHeap;
