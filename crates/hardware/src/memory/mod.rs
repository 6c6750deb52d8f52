//! Main memory (DRAM) model.
//!
//! This module implements the backing store the cache hierarchy misses into:
//! 1. **Mapping:** Splits addresses into bank, row, and column.
//! 2. **Controller:** Banked device with row-buffer timing (RAS, CAS, precharge).
//! 3. **Occupancy:** Optional per-row capacity tracking with a relocation fallback.

/// Address mapping policies and DRAM geometry.
pub mod mapping;

/// DRAM bank state machine and device.
pub mod controller;

/// Per-row capacity tracking.
pub mod occupancy;

pub use controller::{BankState, DramAccess, DramBank, DramDevice, DramTiming, RowBufferOutcome};
pub use mapping::{AddressMapper, DramCoord, DramGeometry};
