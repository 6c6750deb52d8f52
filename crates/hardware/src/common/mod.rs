//! Common types shared by every layer of the model.
//!
//! 1. **Address:** The 32-bit address newtype consumed by mapping and cache indexing.
//! 2. **Errors:** Configuration, scheduling, and trace errors plus the aggregate `SimError`.
//! 3. **Bit helpers:** Power-of-two and log2 utilities used to derive geometry.

/// Address type definition.
pub mod addr;

/// Error types.
pub mod error;

pub use addr::Address;
pub use error::{ConfigError, SchedulerError, SimError, SimResult, TraceError};

/// Returns `ceil(log2(value))`, the number of bits needed to index `value` items.
///
/// `bits_for(1)` is 0; `bits_for(0)` is also 0 and is rejected by callers
/// before it matters.
pub const fn bits_for(value: usize) -> u32 {
    if value <= 1 {
        0
    } else {
        usize::BITS - (value - 1).leading_zeros()
    }
}

/// Returns a mask with the low `bits` bits set.
pub const fn mask(bits: u32) -> u32 {
    if bits >= 32 { u32::MAX } else { (1u32 << bits) - 1 }
}
