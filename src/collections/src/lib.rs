//! # Keyward Collections
//!
//! Reusable data-structure primitives for the authorization engine:
//!
//! - [`BoundedCache`]: fixed-capacity, thread-safe LRU key/value cache
//! - [`PriorityQueue`]: heap-backed cost-ordered queue (min-first or max-first)

pub mod bounded_cache;
pub mod error;
pub mod priority_queue;

pub use bounded_cache::{BoundedCache, CacheStats};
pub use error::{QueueError, Result};
pub use priority_queue::{Order, PriorityQueue};
