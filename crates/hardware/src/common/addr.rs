//! Memory address type.
//!
//! The model works on a flat 32-bit address space. Wrapping the raw value in a
//! newtype keeps addresses from being confused with the bank, row, column, and
//! cycle counts that flow through the same code paths.

use std::fmt;

/// A 32-bit byte address presented to the memory hierarchy.
///
/// Addresses are immutable values; every structure that derives an index, tag,
/// or DRAM coordinate from one does so without modifying it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub u32);

impl Address {
    /// Creates a new address from a raw 32-bit value.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw 32-bit address value.
    ///
    /// # Returns
    ///
    /// A new `Address` wrapping the provided value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw 32-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Returns this address with the low `offset_bits` cleared.
    ///
    /// Used to compare addresses at cache-block granularity.
    #[inline]
    pub const fn align_down(self, offset_bits: u32) -> Self {
        if offset_bits >= 32 {
            Self(0)
        } else {
            Self(self.0 & !((1u32 << offset_bits) - 1))
        }
    }
}

impl From<u32> for Address {
    fn from(addr: u32) -> Self {
        Self(addr)
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
