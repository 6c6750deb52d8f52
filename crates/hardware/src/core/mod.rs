//! Cache model.
//!
//! 1. **Cache:** A single direct-mapped level with single-slot eviction.
//! 2. **Hierarchy:** Three levels over the DRAM device with an eviction cascade.

/// Direct-mapped cache level.
pub mod cache;

/// L1/L2/L3 hierarchy and per-access outcomes.
pub mod hierarchy;

pub use cache::{CacheLevel, CacheLine};
pub use hierarchy::{AccessOutcome, HitLevel, MemoryHierarchy};
