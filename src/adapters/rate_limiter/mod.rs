//! Rate limiter adapters.
//!
//! - `InMemoryRateLimiter` - Fixed-window counters held in process memory

mod in_memory;

pub use in_memory::InMemoryRateLimiter;
