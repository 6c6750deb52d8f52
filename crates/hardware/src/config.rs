//! Configuration system for the memory latency model.
//!
//! This module defines all configuration structures and enums used to
//! parameterize a simulation run. It provides:
//! 1. **Defaults:** Baseline cache sizes, DRAM geometry, and DRAM timing.
//! 2. **Structures:** Hierarchical config for caches, DRAM, and the scheduler.
//! 3. **Enums:** Address mapping and scheduling policies.
//! 4. **Validation:** Every constructor path rejects bad geometry up front.
//!
//! Configuration is supplied as JSON (`Config::from_json` / `Config::from_file`)
//! or built in code starting from `Config::default()`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::common::ConfigError;
use crate::memory::mapping::DramGeometry;

/// Default configuration constants.
///
/// These values reproduce the reference platform: a 32 KiB / 32 KiB / 2 MiB
/// direct-mapped hierarchy in front of a 4-bank DRAM with a 4-byte bus.
mod defaults {
    /// L1 size in bytes (32 KiB).
    pub const L1_SIZE: usize = 32 * 1024;
    /// L2 size in bytes (32 KiB).
    pub const L2_SIZE: usize = 32 * 1024;
    /// L3 size in bytes (2 MiB).
    pub const L3_SIZE: usize = 2 * 1024 * 1024;

    /// Cache line size in bytes, shared by every level by default.
    pub const LINE_BYTES: usize = 64;

    /// L1 access time in cycles.
    pub const L1_LATENCY: u64 = 1;
    /// L2 access time in cycles.
    pub const L2_LATENCY: u64 = 6;
    /// L3 access time in cycles.
    pub const L3_LATENCY: u64 = 30;

    /// Number of DRAM banks.
    pub const BANKS: usize = 4;
    /// Rows per bank (2^18).
    pub const ROWS: usize = 262_144;
    /// Columns per row (2^10).
    pub const COLUMNS: usize = 1024;
    /// Data bus width in bytes; the low log2 bits of an address select a byte
    /// within one column burst.
    pub const BUS_WIDTH: usize = 4;
    /// Cache block size used by block interleaving.
    pub const BLOCK_BYTES: usize = 64;

    /// Row activation (RAS) time in cycles.
    pub const T_RAS: u64 = 100;
    /// Column access (CAS) time in cycles.
    pub const T_CAS: u64 = 50;
    /// Precharge time in cycles.
    pub const T_PRE: u64 = 50;

    /// Pending request queue capacity.
    pub const QUEUE_CAPACITY: usize = 32;

    /// Bytes addressable with a 32-bit address.
    pub const ADDRESS_SPACE: u64 = 1 << 32;
}

/// Address-to-DRAM mapping policy.
///
/// Selects which address bits choose the bank, row, and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum MappingPolicy {
    /// Column bits lowest, then bank bits, then row bits.
    ///
    /// Sequential addresses walk a whole row before moving to the next bank.
    #[default]
    #[serde(alias = "Row", alias = "row")]
    RowInterleaved,
    /// Bank bits sit directly above the cache-block offset.
    ///
    /// Consecutive cache blocks round-robin across banks before the row
    /// advances.
    #[serde(alias = "Block", alias = "block")]
    CacheBlockInterleaved,
}

/// Request dispatch policy for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SchedulePolicy {
    /// First come, first served by arrival time.
    #[default]
    #[serde(alias = "FCFS", alias = "fcfs")]
    Fcfs,
    /// Stable sort of the pending batch by DRAM row before dispatch.
    #[serde(alias = "Row", alias = "row")]
    RowConflictMinimizing,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use memlat_core::config::{Config, MappingPolicy};
///
/// let json = r#"{
///     "dram": { "mapping": "CacheBlockInterleaved", "t_ras": 20 },
///     "scheduler": { "queue_capacity": 8 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.dram.mapping, MappingPolicy::CacheBlockInterleaved);
/// assert_eq!(config.dram.t_ras, 20);
/// assert_eq!(config.dram.t_cas, 50);
/// assert_eq!(config.cache.l1.size_bytes, 32 * 1024);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache hierarchy configuration
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
    /// DRAM geometry, timing, and mapping
    #[serde(default)]
    pub dram: DramConfig,
    /// Request scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// Checks every section; the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.l1.validate("L1")?;
        self.cache.l2.validate("L2")?;
        self.cache.l3.validate("L3")?;
        let _ = DramGeometry::from_config(&self.dram)?;
        self.scheduler.validate()
    }
}

/// Cache hierarchy configuration (three direct-mapped levels).
///
/// Each level may be given partially; any field left out keeps that level's
/// own default.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheHierarchyConfig {
    /// First-level cache
    #[serde(
        default = "CacheHierarchyConfig::default_l1",
        deserialize_with = "CacheHierarchyConfig::l1_over_defaults"
    )]
    pub l1: CacheConfig,
    /// Second-level cache
    #[serde(
        default = "CacheHierarchyConfig::default_l2",
        deserialize_with = "CacheHierarchyConfig::l2_over_defaults"
    )]
    pub l2: CacheConfig,
    /// Last-level cache
    #[serde(
        default = "CacheHierarchyConfig::default_l3",
        deserialize_with = "CacheHierarchyConfig::l3_over_defaults"
    )]
    pub l3: CacheConfig,
}

impl CacheHierarchyConfig {
    const fn default_l1() -> CacheConfig {
        CacheConfig::new(defaults::L1_SIZE, defaults::LINE_BYTES, defaults::L1_LATENCY)
    }

    const fn default_l2() -> CacheConfig {
        CacheConfig::new(defaults::L2_SIZE, defaults::LINE_BYTES, defaults::L2_LATENCY)
    }

    const fn default_l3() -> CacheConfig {
        CacheConfig::new(defaults::L3_SIZE, defaults::LINE_BYTES, defaults::L3_LATENCY)
    }

    fn l1_over_defaults<'de, D: Deserializer<'de>>(d: D) -> Result<CacheConfig, D::Error> {
        Ok(CacheOverrides::deserialize(d)?.apply(Self::default_l1()))
    }

    fn l2_over_defaults<'de, D: Deserializer<'de>>(d: D) -> Result<CacheConfig, D::Error> {
        Ok(CacheOverrides::deserialize(d)?.apply(Self::default_l2()))
    }

    fn l3_over_defaults<'de, D: Deserializer<'de>>(d: D) -> Result<CacheConfig, D::Error> {
        Ok(CacheOverrides::deserialize(d)?.apply(Self::default_l3()))
    }
}

/// The fields of one cache level as written in the JSON, before defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheOverrides {
    size_bytes: Option<usize>,
    line_bytes: Option<usize>,
    latency: Option<u64>,
}

impl CacheOverrides {
    fn apply(self, base: CacheConfig) -> CacheConfig {
        CacheConfig {
            size_bytes: self.size_bytes.unwrap_or(base.size_bytes),
            line_bytes: self.line_bytes.unwrap_or(base.line_bytes),
            latency: self.latency.unwrap_or(base.latency),
        }
    }
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            l1: Self::default_l1(),
            l2: Self::default_l2(),
            l3: Self::default_l3(),
        }
    }
}

/// Individual cache level configuration.
///
/// Associativity is fixed at one way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Total cache size in bytes
    pub size_bytes: usize,

    /// Cache line size in bytes
    pub line_bytes: usize,

    /// Access latency in cycles
    pub latency: u64,
}

impl CacheConfig {
    /// Creates a cache level description.
    pub const fn new(size_bytes: usize, line_bytes: usize, latency: u64) -> Self {
        Self {
            size_bytes,
            line_bytes,
            latency,
        }
    }

    /// Number of line slots this level holds.
    pub const fn num_lines(&self) -> usize {
        self.size_bytes / self.line_bytes
    }

    /// Rejects zero or non-power-of-two sizes, a line larger than the cache,
    /// and a cache larger than the 32-bit address space.
    ///
    /// # Arguments
    ///
    /// * `level` - Level name used in the error message.
    pub fn validate(&self, level: &'static str) -> Result<(), ConfigError> {
        check_pow2("cache size", self.size_bytes)?;
        check_pow2("cache line size", self.line_bytes)?;
        if self.size_bytes as u64 > defaults::ADDRESS_SPACE {
            return Err(ConfigError::CacheExceedsAddressSpace {
                level,
                size_bytes: self.size_bytes,
            });
        }
        if self.line_bytes > self.size_bytes {
            return Err(ConfigError::LineExceedsCache {
                level,
                line_bytes: self.line_bytes,
                size_bytes: self.size_bytes,
            });
        }
        Ok(())
    }
}

/// DRAM device configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DramConfig {
    /// Number of banks
    pub banks: usize,
    /// Rows per bank
    pub rows: usize,
    /// Columns per row
    pub columns: usize,
    /// Data bus width in bytes
    pub bus_width: usize,
    /// Cache block size used by block interleaving
    pub block_bytes: usize,
    /// Row activation latency
    pub t_ras: u64,
    /// Column access latency
    pub t_cas: u64,
    /// Precharge latency
    pub t_pre: u64,
    /// Address mapping policy
    pub mapping: MappingPolicy,
    /// Track per-row occupancy and relocate accesses that land in a full row
    pub track_row_capacity: bool,
}

impl Default for DramConfig {
    /// Creates the reference DRAM: 4 banks × 2^18 rows × 1024 columns,
    /// RAS 100, CAS 50, precharge 50, row interleaving.
    fn default() -> Self {
        Self {
            banks: defaults::BANKS,
            rows: defaults::ROWS,
            columns: defaults::COLUMNS,
            bus_width: defaults::BUS_WIDTH,
            block_bytes: defaults::BLOCK_BYTES,
            t_ras: defaults::T_RAS,
            t_cas: defaults::T_CAS,
            t_pre: defaults::T_PRE,
            mapping: MappingPolicy::default(),
            track_row_capacity: false,
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Dispatch policy
    pub policy: SchedulePolicy,
    /// Maximum number of pending requests
    pub queue_capacity: usize,
}

impl SchedulerConfig {
    /// Rejects a zero-capacity queue.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::Zero {
                what: "scheduler queue capacity",
            });
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policy: SchedulePolicy::default(),
            queue_capacity: defaults::QUEUE_CAPACITY,
        }
    }
}

fn check_pow2(what: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { what })
    } else if !value.is_power_of_two() {
        Err(ConfigError::NotPowerOfTwo { what, value })
    } else {
        Ok(())
    }
}
