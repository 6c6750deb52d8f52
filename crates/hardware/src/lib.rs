//! Memory subsystem latency model.
//!
//! This crate estimates the latency a memory hierarchy imposes on a stream of
//! 32-bit addresses:
//! 1. **Memory:** Address-to-bank/row/column mapping and a banked DRAM with
//!    row-buffer timing.
//! 2. **Core:** Direct-mapped L1/L2/L3 caches with an eviction cascade into DRAM.
//! 3. **Simulation:** Request scheduling, trace extraction, and the driver
//!    tying them together.
//! 4. **Statistics:** Hit/miss counts, cycle totals, and report printing.
//!
//! # Examples
//!
//! ```
//! use memlat_core::{Address, Config, MemoryHierarchy};
//!
//! let mut hierarchy = MemoryHierarchy::new(&Config::default()).unwrap();
//! let first = hierarchy.access(Address::new(0x1000));
//! let second = hierarchy.access(Address::new(0x1000));
//!
//! assert!(!first.level.is_hit());
//! assert_eq!(first.latency, 150 + 1 + 6 + 30);
//! assert_eq!(second.latency, 1);
//! assert_eq!(hierarchy.stats().total_commands, 2);
//! ```

/// Common types (addresses, errors, bit helpers).
pub mod common;
/// Model configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Cache levels and the three-level hierarchy.
pub mod core;
/// DRAM mapping, banks, and timing.
pub mod memory;
/// Scheduling, trace extraction, and the simulation driver.
pub mod sim;
/// Statistics collection and reporting.
pub mod stats;

/// 32-bit address newtype.
pub use crate::common::Address;
/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Three-level cache hierarchy over DRAM.
pub use crate::core::MemoryHierarchy;
/// Trace-driven simulation driver.
pub use crate::sim::Simulator;
/// Aggregate statistics.
pub use crate::stats::SimStats;
