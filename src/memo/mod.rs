//! Memo Module
//!
//! Call coalescing and the memoizing wrapper built on top of the cache.

mod memoizer;
mod registry;

pub use memoizer::{MemoStats, Memoizer, Operation};
pub use registry::{KeyGuard, KeyLocks};
