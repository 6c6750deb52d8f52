//! Per-row capacity tracking.
//!
//! When enabled, the DRAM device remembers which distinct addresses have been
//! placed in each `(bank, row)`. A row holds at most one address per column.
//! An address that maps to a full row is relocated to the first row (in bank,
//! then row order) that still has room.
//!
//! The relocation search is a linear scan over every row of every bank, so it
//! costs O(banks × rows) in the worst case. It runs only when the mapped row is
//! already full; the common path is a single hash lookup.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::mapping::{DramCoord, DramGeometry};
use crate::common::Address;

/// Where an access ended up after the capacity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Coordinate the access is serviced at.
    pub coord: DramCoord,
    /// True when the mapped row was full and the access moved elsewhere.
    pub relocated: bool,
}

/// Sparse record of which addresses live in which row.
#[derive(Debug, Clone)]
pub struct RowOccupancy {
    banks: u32,
    rows: u32,
    capacity: usize,
    placed: HashMap<(u32, u32), HashSet<Address>>,
}

impl RowOccupancy {
    /// Creates an empty tracker; each row holds `geometry.columns` addresses.
    pub fn new(geometry: &DramGeometry) -> Self {
        Self {
            banks: geometry.banks,
            rows: geometry.rows,
            capacity: geometry.columns as usize,
            placed: HashMap::new(),
        }
    }

    /// Number of addresses recorded in `(bank, row)`.
    pub fn count(&self, bank: u32, row: u32) -> usize {
        self.placed.get(&(bank, row)).map_or(0, HashSet::len)
    }

    /// Returns true when `addr` has already been placed in `(bank, row)`.
    pub fn holds(&self, bank: u32, row: u32, addr: Address) -> bool {
        self.placed
            .get(&(bank, row))
            .is_some_and(|set| set.contains(&addr))
    }

    /// Records `addr` at its mapped coordinate, or relocates it if that row is full.
    ///
    /// If every row is full the access stays at the mapped coordinate and is
    /// not recorded.
    pub fn place(&mut self, mapped: DramCoord, addr: Address) -> Placement {
        let stay = Placement {
            coord: mapped,
            relocated: false,
        };
        if self.holds(mapped.bank, mapped.row, addr) {
            return stay;
        }
        if self.count(mapped.bank, mapped.row) < self.capacity {
            self.record(mapped.bank, mapped.row, addr);
            return stay;
        }

        debug!(
            bank = mapped.bank,
            row = mapped.row,
            %addr,
            "row full, scanning for a free row"
        );
        match self.find_free_row() {
            Some((bank, row)) => {
                self.record(bank, row, addr);
                Placement {
                    coord: DramCoord::new(bank, row, mapped.column),
                    relocated: true,
                }
            }
            None => {
                warn!(%addr, "every DRAM row is full, keeping mapped location");
                stay
            }
        }
    }

    /// Forgets every placement.
    pub fn clear(&mut self) {
        self.placed.clear();
    }

    fn record(&mut self, bank: u32, row: u32, addr: Address) {
        let _ = self.placed.entry((bank, row)).or_default().insert(addr);
    }

    fn find_free_row(&self) -> Option<(u32, u32)> {
        (0..self.banks)
            .flat_map(|bank| (0..self.rows).map(move |row| (bank, row)))
            .find(|&(bank, row)| self.count(bank, row) < self.capacity)
    }
}
