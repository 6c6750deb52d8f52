//! Address-to-DRAM coordinate mapping.
//!
//! A linear address is split into `(bank, row, column)` according to one of
//! two interleaving policies. Field widths come from [`DramGeometry`], which is
//! derived once from the configuration and validated so that every 32-bit
//! address maps to an in-range coordinate.
//!
//! Bit layouts, low to high (`off` = bus offset, `k` = column bits covered by
//! one cache block):
//!
//! ```text
//! RowInterleaved         | off | column            | bank | row |
//! CacheBlockInterleaved  | off | column[0..k] | bank | column[k..] | row |
//! ```

use std::fmt;

use crate::common::{Address, ConfigError, bits_for, mask};
use crate::config::{DramConfig, MappingPolicy};

/// A DRAM location: bank, row within the bank, column within the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DramCoord {
    /// Bank index
    pub bank: u32,
    /// Row index within the bank
    pub row: u32,
    /// Column index within the row
    pub column: u32,
}

impl DramCoord {
    /// Creates a coordinate.
    pub const fn new(bank: u32, row: u32, column: u32) -> Self {
        Self { bank, row, column }
    }
}

impl fmt::Display for DramCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.bank, self.row, self.column)
    }
}

/// Bit widths and dimension sizes of a DRAM device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DramGeometry {
    /// Number of banks.
    pub banks: u32,
    /// Rows per bank.
    pub rows: u32,
    /// Columns per row.
    pub columns: u32,
    /// Low address bits selecting a byte within one bus transfer.
    pub offset_bits: u32,
    /// Bits needed to index a column.
    pub column_bits: u32,
    /// Bits needed to index a bank.
    pub bank_bits: u32,
    /// Bits needed to index a row.
    pub row_bits: u32,
    /// log2 of the cache block size.
    pub block_bits: u32,
}

impl DramGeometry {
    /// Derives and validates the geometry for a DRAM configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a dimension is zero, the bus width or block
    /// size is not a power of two, the fields need more than 32 address bits,
    /// or the cache block cannot be folded into the column field.
    pub fn from_config(config: &DramConfig) -> Result<Self, ConfigError> {
        nonzero("DRAM bank count", config.banks)?;
        nonzero("DRAM row count", config.rows)?;
        nonzero("DRAM column count", config.columns)?;
        pow2("DRAM bus width", config.bus_width)?;
        pow2("DRAM block size", config.block_bytes)?;

        let offset_bits = bits_for(config.bus_width);
        let column_bits = bits_for(config.columns);
        let bank_bits = bits_for(config.banks);
        let row_bits = bits_for(config.rows);
        let block_bits = bits_for(config.block_bytes);

        let total = offset_bits + column_bits + bank_bits + row_bits;
        if total > 32 {
            return Err(ConfigError::GeometryTooWide { bits: total });
        }
        if block_bits < offset_bits || block_bits - offset_bits > column_bits {
            return Err(ConfigError::BlockNotFoldable {
                block_bytes: config.block_bytes,
                columns: config.columns,
                bus_width: config.bus_width,
            });
        }

        Ok(Self {
            banks: config.banks as u32,
            rows: config.rows as u32,
            columns: config.columns as u32,
            offset_bits,
            column_bits,
            bank_bits,
            row_bits,
            block_bits,
        })
    }

    /// Total number of rows across all banks.
    pub const fn total_rows(&self) -> u64 {
        self.banks as u64 * self.rows as u64
    }

    /// Column bits covered by the intra-block offset under block interleaving.
    const fn block_column_bits(&self) -> u32 {
        self.block_bits - self.offset_bits
    }

    /// Returns true when `coord` lies inside the declared dimensions.
    pub const fn contains(&self, coord: DramCoord) -> bool {
        coord.bank < self.banks && coord.row < self.rows && coord.column < self.columns
    }
}

/// Splits addresses into DRAM coordinates under a fixed policy and geometry.
///
/// The policy is chosen once at construction; `map` is pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMapper {
    policy: MappingPolicy,
    geometry: DramGeometry,
}

impl AddressMapper {
    /// Creates a mapper for a validated geometry.
    pub const fn new(policy: MappingPolicy, geometry: DramGeometry) -> Self {
        Self { policy, geometry }
    }

    /// Builds the geometry from `config` and wraps it with the configured policy.
    pub fn from_config(config: &DramConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.mapping, DramGeometry::from_config(config)?))
    }

    /// The active mapping policy.
    pub const fn policy(&self) -> MappingPolicy {
        self.policy
    }

    /// The geometry this mapper splits addresses against.
    pub const fn geometry(&self) -> &DramGeometry {
        &self.geometry
    }

    /// Maps an address to its DRAM coordinate.
    ///
    /// # Panics
    ///
    /// Panics if the computed coordinate falls outside the geometry. That can
    /// only happen through a defect in this function, never through input.
    pub fn map(&self, addr: Address) -> DramCoord {
        let coord = match self.policy {
            MappingPolicy::RowInterleaved => self.row_interleaved(addr.val()),
            MappingPolicy::CacheBlockInterleaved => self.block_interleaved(addr.val()),
        };
        assert!(
            self.geometry.contains(coord),
            "address mapper produced {coord} for {addr}, outside {}x{}x{}",
            self.geometry.banks,
            self.geometry.rows,
            self.geometry.columns
        );
        coord
    }

    /// Row index of `addr`; the sort key of the row-conflict scheduler.
    pub fn row_of(&self, addr: Address) -> u32 {
        self.map(addr).row
    }

    fn row_interleaved(&self, a: u32) -> DramCoord {
        let g = &self.geometry;
        let mut shift = g.offset_bits;
        let column = field(a, shift, g.column_bits);
        shift += g.column_bits;
        let bank = field(a, shift, g.bank_bits);
        shift += g.bank_bits;
        let row = field(a, shift, g.row_bits);
        self.fold(bank, row, column)
    }

    fn block_interleaved(&self, a: u32) -> DramCoord {
        let g = &self.geometry;
        let low_bits = g.block_column_bits();
        let mut shift = g.offset_bits;
        let column_low = field(a, shift, low_bits);
        shift += low_bits;
        let bank = field(a, shift, g.bank_bits);
        shift += g.bank_bits;
        let column_high = field(a, shift, g.column_bits - low_bits);
        shift += g.column_bits - low_bits;
        let row = field(a, shift, g.row_bits);
        self.fold(bank, row, column_low | (column_high << low_bits))
    }

    /// Reduces each field into range for dimensions that are not a power of two.
    const fn fold(&self, bank: u32, row: u32, column: u32) -> DramCoord {
        let g = &self.geometry;
        DramCoord::new(bank % g.banks, row % g.rows, column % g.columns)
    }
}

/// Extracts `bits` bits of `value` starting at `shift`.
#[inline]
const fn field(value: u32, shift: u32, bits: u32) -> u32 {
    if shift >= 32 {
        0
    } else {
        (value >> shift) & mask(bits)
    }
}

fn nonzero(what: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Zero { what });
    }
    Ok(())
}

fn pow2(what: &'static str, value: usize) -> Result<(), ConfigError> {
    nonzero(what, value)?;
    if !value.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo { what, value });
    }
    Ok(())
}
