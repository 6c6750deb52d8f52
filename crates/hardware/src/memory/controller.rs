//! Banked DRAM device with per-bank row buffers.
//!
//! Each bank is a two-state machine: **Closed** (precharged, no row latched)
//! or **Open(row)**. An access to `(bank, row)` costs:
//! 1. **Row hit:** the row is already open, so only CAS is paid.
//! 2. **Row empty:** the bank is closed; RAS opens the row, then CAS.
//! 3. **Row conflict:** another row is open; precharge closes it, RAS opens
//!    the new row, then CAS.
//!
//! The device keeps a global time counter advanced by the latency of every
//! completed access. Latencies are in cycles.

use std::fmt;

use tracing::trace;

use super::mapping::{AddressMapper, DramCoord};
use super::occupancy::RowOccupancy;
use crate::common::{Address, ConfigError};
use crate::config::DramConfig;

/// Row-buffer state of a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BankState {
    /// No row latched in the sense amplifiers.
    #[default]
    Closed,
    /// The given row is latched and can be read with CAS alone.
    Open(u32),
}

/// What the row buffer looked like when an access arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowBufferOutcome {
    /// Requested row was already open.
    Hit,
    /// Bank was closed; the row had to be activated.
    Empty,
    /// A different row was open; precharge then activate.
    Conflict,
}

impl RowBufferOutcome {
    /// True when the access paid a row activation.
    pub const fn activated(self) -> bool {
        !matches!(self, Self::Hit)
    }
}

/// DRAM timing constants in cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DramTiming {
    /// Row activation (RAS) latency.
    pub t_ras: u64,
    /// Column access (CAS) latency.
    pub t_cas: u64,
    /// Precharge latency.
    pub t_pre: u64,
}

impl DramTiming {
    /// Latency charged for an access with the given row-buffer outcome.
    pub const fn latency(&self, outcome: RowBufferOutcome) -> u64 {
        match outcome {
            RowBufferOutcome::Hit => self.t_cas,
            RowBufferOutcome::Empty => self.t_ras + self.t_cas,
            RowBufferOutcome::Conflict => self.t_pre + self.t_ras + self.t_cas,
        }
    }
}

/// A single DRAM bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DramBank {
    /// Row-buffer state.
    pub state: BankState,
    /// Device time at which the last access to this bank completed.
    pub last_access_time: u64,
}

impl DramBank {
    /// Latches `row`, returning what the row buffer held beforehand.
    fn activate(&mut self, row: u32) -> RowBufferOutcome {
        let outcome = match self.state {
            BankState::Open(open) if open == row => RowBufferOutcome::Hit,
            BankState::Open(_) => RowBufferOutcome::Conflict,
            BankState::Closed => RowBufferOutcome::Empty,
        };
        self.state = BankState::Open(row);
        outcome
    }

    /// The currently open row, if any.
    pub const fn active_row(&self) -> Option<u32> {
        match self.state {
            BankState::Open(row) => Some(row),
            BankState::Closed => None,
        }
    }
}

/// Record of one completed DRAM access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DramAccess {
    /// Address that was accessed.
    pub address: Address,
    /// Coordinate the access was serviced at.
    pub coord: DramCoord,
    /// True exactly when no RAS or precharge penalty was charged.
    pub row_was_open: bool,
    /// Row-buffer outcome.
    pub outcome: RowBufferOutcome,
    /// Cycles charged for this access.
    pub latency: u64,
    /// True when a full row forced the access to a different row.
    pub relocated: bool,
}

impl fmt::Display for DramAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<4} | {:<6} | {:<6} | {} | {:<9} | {:<7} cycles",
            self.coord.bank,
            self.coord.row,
            self.coord.column,
            self.address,
            if self.row_was_open { "Yes" } else { "No" },
            self.latency
        )
    }
}

/// Multi-bank DRAM device.
#[derive(Debug, Clone)]
pub struct DramDevice {
    banks: Vec<DramBank>,
    global_time: u64,
    timing: DramTiming,
    mapper: AddressMapper,
    occupancy: Option<RowOccupancy>,
}

impl DramDevice {
    /// Creates a device with every bank closed and time zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the geometry is invalid.
    pub fn new(config: &DramConfig) -> Result<Self, ConfigError> {
        let mapper = AddressMapper::from_config(config)?;
        let occupancy = config
            .track_row_capacity
            .then(|| RowOccupancy::new(mapper.geometry()));
        Ok(Self {
            banks: vec![DramBank::default(); mapper.geometry().banks as usize],
            global_time: 0,
            timing: DramTiming {
                t_ras: config.t_ras,
                t_cas: config.t_cas,
                t_pre: config.t_pre,
            },
            mapper,
            occupancy,
        })
    }

    /// Maps `addr` and performs the access.
    pub fn access(&mut self, addr: Address) -> DramAccess {
        let mapped = self.mapper.map(addr);
        let placement = match self.occupancy.as_mut() {
            Some(occupancy) => occupancy.place(mapped, addr),
            None => super::occupancy::Placement {
                coord: mapped,
                relocated: false,
            },
        };
        let mut access = self.access_coord(placement.coord, addr);
        access.relocated = placement.relocated;
        access
    }

    /// Performs an access at an already-mapped coordinate.
    ///
    /// # Panics
    ///
    /// Panics if `coord.bank` is not a bank of this device.
    pub fn access_coord(&mut self, coord: DramCoord, addr: Address) -> DramAccess {
        let bank_count = self.banks.len();
        let Some(bank) = self.banks.get_mut(coord.bank as usize) else {
            panic!("DRAM bank {} out of range ({bank_count} banks)", coord.bank);
        };

        let outcome = bank.activate(coord.row);
        let latency = self.timing.latency(outcome);
        self.global_time += latency;
        bank.last_access_time = self.global_time;

        trace!(%addr, %coord, ?outcome, latency, "dram access");

        DramAccess {
            address: addr,
            coord,
            row_was_open: !outcome.activated(),
            outcome,
            latency,
            relocated: false,
        }
    }

    /// Total cycles consumed by every access so far.
    pub const fn global_time(&self) -> u64 {
        self.global_time
    }

    /// State of bank `index`, if it exists.
    pub fn bank(&self, index: usize) -> Option<&DramBank> {
        self.banks.get(index)
    }

    /// All banks, in index order.
    pub fn banks(&self) -> &[DramBank] {
        &self.banks
    }

    /// Timing constants.
    pub const fn timing(&self) -> &DramTiming {
        &self.timing
    }

    /// The mapper used by [`access`](Self::access).
    pub const fn mapper(&self) -> &AddressMapper {
        &self.mapper
    }

    /// Per-row occupancy, when capacity tracking is enabled.
    pub const fn occupancy(&self) -> Option<&RowOccupancy> {
        self.occupancy.as_ref()
    }

    /// Closes every bank and rewinds time to zero.
    pub fn reset(&mut self) {
        self.banks.fill(DramBank::default());
        self.global_time = 0;
        if let Some(occupancy) = self.occupancy.as_mut() {
            occupancy.clear();
        }
    }

    /// Prints the bank table and global time to stdout.
    pub fn print_state(&self) {
        println!("DRAM STATE");
        println!("  bank | active row | last access");
        for (i, bank) in self.banks.iter().enumerate() {
            let row = bank
                .active_row()
                .map_or_else(|| "closed".to_string(), |r| r.to_string());
            println!("  {i:<4} | {row:<10} | {}", bank.last_access_time);
        }
        println!("  global time            {}", self.global_time);
    }
}
