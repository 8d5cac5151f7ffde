//! Shulz Memo - memoization for expensive single-argument lookups
//!
//! Wraps an operation so that fresh results come from a bounded TTL/LRU
//! store, and concurrent callers asking for the same missing key share a
//! single execution.
//!
//! ```ignore
//! let lookup = Memoizer::new(|id: u64| fetch_remote(id));
//! let value = lookup.call(42)?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod memo;

pub use cache::{Cache, CacheStore};
pub use config::Config;
pub use error::{CacheError, ConfigError};
pub use memo::{MemoStats, Memoizer, Operation};
