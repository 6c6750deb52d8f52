//! Shared helpers for memory model tests.

use memlat_core::common::Address;
use memlat_core::config::{CacheConfig, Config, DramConfig};

/// Address of `(bank, row, column)` under the default row-interleaved layout.
///
/// Default geometry: 2 offset bits, 10 column bits, 2 bank bits, 18 row bits.
pub const fn row_address(bank: u32, row: u32, column: u32) -> Address {
    Address::new((row << 14) | (bank << 12) | (column << 2))
}

/// Default configuration with every cache level replaced by `l1`, `l2`, `l3`.
pub fn with_caches(l1: CacheConfig, l2: CacheConfig, l3: CacheConfig) -> Config {
    let mut config = Config::default();
    config.cache.l1 = l1;
    config.cache.l2 = l2;
    config.cache.l3 = l3;
    config
}

/// A hierarchy whose levels each hold a single 64-byte line.
///
/// Any four distinct blocks push the first one out of L3.
pub fn one_line_caches() -> Config {
    with_caches(
        CacheConfig::new(64, 64, 1),
        CacheConfig::new(64, 64, 6),
        CacheConfig::new(64, 64, 30),
    )
}

/// Small caches (1 KiB / 2 KiB / 4 KiB) that keep property tests fast.
pub fn small_caches() -> Config {
    with_caches(
        CacheConfig::new(1024, 64, 1),
        CacheConfig::new(2048, 64, 6),
        CacheConfig::new(4096, 64, 30),
    )
}

/// A tiny DRAM: 2 banks × 2 rows × 2 columns over a 4-byte bus, 4-byte blocks.
///
/// Row interleaving uses bit 2 for the column, bit 3 for the bank, bit 4 for
/// the row; higher bits are ignored.
pub fn tiny_dram() -> DramConfig {
    DramConfig {
        banks: 2,
        rows: 2,
        columns: 2,
        bus_width: 4,
        block_bytes: 4,
        ..DramConfig::default()
    }
}

/// Routes `tracing` output to the test harness so warnings show up with
/// `--nocapture`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
