//! Three-level cache hierarchy in front of the DRAM device.
//!
//! Every access walks the levels top-down:
//! 1. **L1 hit:** latency is the L1 latency; nothing moves.
//! 2. **L2 / L3 hit:** latency is the sum of the latencies down to the hit
//!    level; the block is promoted into L1.
//! 3. **Miss:** the block is fetched from DRAM and installed in L1; latency is
//!    the DRAM latency plus all three cache latencies.
//!
//! Installing into L1 starts the eviction cascade: a displaced block moves one
//! level down, possibly displacing another, and a block pushed out of L3 is
//! written back to DRAM. Once the fill is done, stale copies of the promoted
//! block are dropped from L2 and L3 so every block lives in one level only.

use std::fmt;

use tracing::{debug, trace};

use super::cache::CacheLevel;
use crate::common::{Address, ConfigError};
use crate::config::Config;
use crate::memory::{AddressMapper, DramAccess, DramCoord, DramDevice};
use crate::stats::SimStats;

/// Number of cache levels in the hierarchy.
pub const LEVELS: usize = 3;

/// Where an access was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HitLevel {
    /// First-level cache.
    L1,
    /// Second-level cache.
    L2,
    /// Last-level cache.
    L3,
    /// Missed every level and was fetched from DRAM.
    Dram,
}

impl HitLevel {
    /// True for a cache hit at any level.
    pub const fn is_hit(self) -> bool {
        !matches!(self, Self::Dram)
    }

    const fn from_depth(depth: usize) -> Self {
        match depth {
            0 => Self::L1,
            1 => Self::L2,
            2 => Self::L3,
            _ => Self::Dram,
        }
    }
}

impl fmt::Display for HitLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::Dram => "DRAM",
        })
    }
}

/// Result of one hierarchy access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    /// Address that was accessed.
    pub address: Address,
    /// Level that satisfied the access.
    pub level: HitLevel,
    /// Cycles charged for the lookup and, on a miss, the DRAM fetch.
    pub latency: u64,
    /// DRAM location of the address.
    pub coord: DramCoord,
    /// DRAM fetch, present on a miss.
    pub dram: Option<DramAccess>,
    /// DRAM writeback of a block pushed out of L3.
    pub writeback: Option<DramAccess>,
}

impl AccessOutcome {
    /// Latency plus any writeback cost; what the access adds to total cycles.
    pub fn total_latency(&self) -> u64 {
        self.latency + self.writeback.map_or(0, |w| w.latency)
    }

    /// True when the access reached DRAM and found its row already open.
    pub fn row_was_open(&self) -> Option<bool> {
        self.dram.map(|d| d.row_was_open)
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = match self.row_was_open() {
            Some(true) => "Yes",
            Some(false) => "No",
            None => "-",
        };
        write!(
            f,
            "{:<4} | {:<6} | {:<6} | {} | {:<9} | {:<7} cycles | {}",
            self.coord.bank,
            self.coord.row,
            self.coord.column,
            self.address,
            open,
            self.total_latency(),
            self.level
        )
    }
}

/// L1, L2, L3, and DRAM with shared statistics.
#[derive(Debug, Clone)]
pub struct MemoryHierarchy {
    levels: [CacheLevel; LEVELS],
    dram: DramDevice,
    stats: SimStats,
}

impl MemoryHierarchy {
    /// Builds a cold hierarchy: every line invalid, every bank closed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any cache or DRAM parameter is invalid.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            levels: [
                CacheLevel::new(&config.cache.l1)?,
                CacheLevel::new(&config.cache.l2)?,
                CacheLevel::new(&config.cache.l3)?,
            ],
            dram: DramDevice::new(&config.dram)?,
            stats: SimStats::default(),
        })
    }

    /// Runs one address through the hierarchy and records it in the stats.
    pub fn access(&mut self, addr: Address) -> AccessOutcome {
        let depth = self
            .levels
            .iter()
            .position(|level| level.probe(addr))
            .unwrap_or(LEVELS);
        let level = HitLevel::from_depth(depth);

        let lookup: u64 = self
            .levels
            .iter()
            .take(depth + 1)
            .map(CacheLevel::latency)
            .sum();
        let dram = (!level.is_hit()).then(|| self.dram.access(addr));
        let latency = lookup + dram.map_or(0, |d| d.latency);

        let writeback = if level == HitLevel::L1 {
            None
        } else {
            self.fill(addr)
        };

        let coord = dram.map_or_else(|| self.dram.mapper().map(addr), |d| d.coord);
        let outcome = AccessOutcome {
            address: addr,
            level,
            latency,
            coord,
            dram,
            writeback,
        };
        trace!(%addr, %level, latency = outcome.total_latency(), "hierarchy access");
        self.stats.record(&outcome);
        outcome
    }

    /// Installs `addr` in L1 and cascades displaced blocks downward.
    ///
    /// A displaced block is carried on only if it differs from the block being
    /// filled. Returns the DRAM writeback of the block pushed out of L3, if any.
    fn fill(&mut self, addr: Address) -> Option<DramAccess> {
        let mut carry = Some(addr);
        for (depth, level) in self.levels.iter_mut().enumerate() {
            let Some(incoming) = carry else { break };
            let filled = addr.align_down(level.offset_bits());
            carry = level.insert(incoming).filter(|&evicted| evicted != filled);
            if let Some(evicted) = carry {
                debug!(
                    level = %HitLevel::from_depth(depth),
                    %incoming,
                    %evicted,
                    "cache eviction"
                );
            }
        }

        for level in &mut self.levels[1..] {
            let _ = level.invalidate(addr);
        }

        carry.map(|victim| {
            debug!(%victim, "writing back L3 victim");
            self.dram.access(victim)
        })
    }

    /// Aggregate statistics since construction or the last reset.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Cache level `n`, counted from 1 (`level(1)` is L1).
    pub fn level(&self, n: usize) -> Option<&CacheLevel> {
        n.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    /// All cache levels, L1 first.
    pub const fn levels(&self) -> &[CacheLevel; LEVELS] {
        &self.levels
    }

    /// The DRAM device.
    pub const fn dram(&self) -> &DramDevice {
        &self.dram
    }

    /// The address mapper used for DRAM accesses.
    pub const fn mapper(&self) -> &AddressMapper {
        self.dram.mapper()
    }

    /// Returns the hierarchy to its freshly constructed state.
    pub fn reset(&mut self) {
        for level in &mut self.levels {
            level.clear();
        }
        self.dram.reset();
        self.stats = SimStats::default();
    }
}
