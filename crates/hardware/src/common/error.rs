//! Error types for the memory latency model.
//!
//! Errors are split by the layer that raises them:
//! 1. **Configuration:** Geometry and timing parameters rejected at construction.
//! 2. **Scheduling:** Recoverable request-queue overflow.
//! 3. **Trace input:** I/O failures while reading trace files.
//!
//! Each concern has its own `thiserror` enum; [`SimError`] aggregates them so
//! callers at the top of the stack can use a single `?` chain.

use std::path::PathBuf;

use thiserror::Error;

use super::addr::Address;

/// Invalid cache, DRAM, or scheduler parameters.
///
/// Raised when a structure is constructed, never while a trace is running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A dimension that must be non-zero was zero.
    #[error("{what} must be non-zero")]
    Zero {
        /// Name of the offending parameter.
        what: &'static str,
    },

    /// A dimension that must be a power of two was not.
    #[error("{what} must be a power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending parameter.
        what: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// A cache line is larger than the cache that should hold it.
    #[error("cache {level}: line size {line_bytes} exceeds cache size {size_bytes}")]
    LineExceedsCache {
        /// Cache level name (`L1`, `L2`, `L3`).
        level: &'static str,
        /// Configured line size in bytes.
        line_bytes: usize,
        /// Configured total size in bytes.
        size_bytes: usize,
    },

    /// A cache is larger than everything a 32-bit address can reach.
    #[error("cache {level}: size {size_bytes} exceeds the 4 GiB address space")]
    CacheExceedsAddressSpace {
        /// Cache level name (`L1`, `L2`, `L3`).
        level: &'static str,
        /// Configured total size in bytes.
        size_bytes: usize,
    },

    /// The DRAM geometry needs more address bits than a 32-bit address has.
    #[error("DRAM geometry needs {bits} address bits, only 32 are available")]
    GeometryTooWide {
        /// Total number of address bits the geometry consumes.
        bits: u32,
    },

    /// The cache-block offset cannot be folded into the DRAM column.
    #[error("{block_bytes} B block does not fold into {columns} columns of {bus_width} B")]
    BlockNotFoldable {
        /// Configured cache block size in bytes.
        block_bytes: usize,
        /// Configured column count.
        columns: usize,
        /// Configured bus width in bytes.
        bus_width: usize,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {message}")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },

    /// The configuration text is not valid JSON for [`Config`](crate::config::Config).
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// Recoverable scheduling conditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The pending queue already holds `capacity` requests.
    ///
    /// The rejected address is returned so the caller can retry it after the
    /// queue drains.
    #[error("request queue full ({capacity} pending), rejected {address}")]
    QueueFull {
        /// Queue capacity at the time of rejection.
        capacity: usize,
        /// Address of the rejected request.
        address: Address,
    },
}

/// Failures while loading an address trace.
#[derive(Error, Debug)]
pub enum TraceError {
    /// The trace file could not be opened or read.
    #[error("failed to read trace '{0}': {1}")]
    Read(PathBuf, #[source] std::io::Error),
}

/// Top-level error type for a simulation run.
#[derive(Error, Debug)]
pub enum SimError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request scheduling failure.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Trace loading failure.
    #[error("trace error: {0}")]
    Trace(#[from] TraceError),
}

/// Result alias used across the crate's fallible entry points.
pub type SimResult<T> = Result<T, SimError>;
