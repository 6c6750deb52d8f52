//! Cache Level Unit Tests.
//!
//! Verifies index/tag decomposition, single-slot eviction with bit-exact
//! reconstruction of the evicted address, invalidation, and construction
//! checks of a direct-mapped level.

use memlat_core::common::{Address, ConfigError};
use memlat_core::config::CacheConfig;
use memlat_core::core::CacheLevel;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ──────────────────────────────────────────────────────────
// Helper: build a small test cache
// ──────────────────────────────────────────────────────────

/// 256 bytes with 64-byte lines.
///
/// With these parameters:
///   - num_lines = 4, offset bits = 6, index bits = 2
///   - index = (addr >> 6) & 3
///   - tag   = addr >> 8
fn small() -> CacheLevel {
    CacheLevel::new(&CacheConfig::new(256, 64, 1)).unwrap()
}

/// Block address with the given tag and index in the small cache.
fn block(tag: u32, index: u32) -> Address {
    Address::new((tag << 8) | (index << 6))
}

// ══════════════════════════════════════════════════════════
// 1. Decomposition
// ══════════════════════════════════════════════════════════

#[test]
fn index_and_tag_split() {
    let cache = small();
    let addr = Address::new(0x1234_56C7);
    assert_eq!(cache.index_of(addr), 3);
    assert_eq!(cache.tag_of(addr), 0x0012_3456);
    assert_eq!(cache.line_address(3, 0x0012_3456), Address::new(0x1234_56C0));
}

#[test]
fn default_l1_geometry() {
    let l1 = CacheLevel::new(&CacheConfig::new(32 * 1024, 64, 1)).unwrap();
    assert_eq!(l1.num_lines(), 512);
    assert_eq!(l1.offset_bits(), 6);
    assert_eq!(l1.index_bits(), 9);
    assert_eq!(l1.block_size(), 64);
    assert_eq!(l1.size(), 32 * 1024);
    assert_eq!(l1.latency(), 1);
    assert_eq!(l1.index_of(Address::new(0x8000)), l1.index_of(Address::new(0)));
}

// ══════════════════════════════════════════════════════════
// 2. Probe and insert
// ══════════════════════════════════════════════════════════

#[test]
fn cold_cache_misses() {
    let cache = small();
    assert!(!cache.probe(Address::new(0)));
    assert_eq!(cache.resident_lines().count(), 0);
}

#[test]
fn insert_into_empty_slot_evicts_nothing() {
    let mut cache = small();
    assert_eq!(cache.insert(block(1, 2)), None);
    assert!(cache.probe(block(1, 2)));
    assert!(cache.probe(Address::new(block(1, 2).val() + 63)));
}

#[test]
fn reinserting_resident_block_evicts_nothing() {
    let mut cache = small();
    let _ = cache.insert(block(5, 0));
    assert_eq!(cache.insert(Address::new(block(5, 0).val() + 8)), None);
}

#[test]
fn same_index_inserts_evict_previous_occupant() {
    let mut cache = small();
    let lines = cache.num_lines() as u32;

    let evicted: Vec<Option<Address>> =
        (0..=lines).map(|tag| cache.insert(block(tag, 1))).collect();

    assert_eq!(evicted[0], None);
    for tag in 1..=lines {
        assert_eq!(evicted[tag as usize], Some(block(tag - 1, 1)));
    }
    assert!(cache.probe(block(lines, 1)));
    assert!(!cache.probe(block(lines - 1, 1)));
}

#[test]
fn different_indexes_coexist() {
    let mut cache = small();
    for index in 0..4 {
        assert_eq!(cache.insert(block(7, index)), None);
    }
    let resident: Vec<_> = cache.resident_lines().collect();
    assert_eq!(
        resident,
        (0..4).map(|i| (i as usize, block(7, i))).collect::<Vec<_>>()
    );
}

// ══════════════════════════════════════════════════════════
// 3. Invalidate and clear
// ══════════════════════════════════════════════════════════

#[test]
fn invalidate_only_matching_block() {
    let mut cache = small();
    let _ = cache.insert(block(3, 0));

    assert!(!cache.invalidate(block(4, 0)));
    assert!(cache.probe(block(3, 0)));

    assert!(cache.invalidate(block(3, 0)));
    assert!(!cache.probe(block(3, 0)));
    assert_eq!(cache.insert(block(4, 0)), None);
}

#[test]
fn clear_empties_every_line() {
    let mut cache = small();
    for index in 0..4 {
        let _ = cache.insert(block(1, index));
    }
    cache.clear();
    assert_eq!(cache.resident_lines().count(), 0);
    assert!(cache.line(0).is_some_and(|l| !l.valid));
}

// ══════════════════════════════════════════════════════════
// 4. Construction checks
// ══════════════════════════════════════════════════════════

#[test]
fn zero_size_rejected() {
    assert!(matches!(
        CacheLevel::new(&CacheConfig::new(0, 64, 1)),
        Err(ConfigError::Zero { .. })
    ));
}

#[test]
fn non_power_of_two_rejected() {
    assert!(matches!(
        CacheLevel::new(&CacheConfig::new(96, 32, 1)),
        Err(ConfigError::NotPowerOfTwo { value: 96, .. })
    ));
    assert!(matches!(
        CacheLevel::new(&CacheConfig::new(1024, 48, 1)),
        Err(ConfigError::NotPowerOfTwo { value: 48, .. })
    ));
}

#[test]
fn line_larger_than_cache_rejected() {
    assert!(matches!(
        CacheLevel::new(&CacheConfig::new(64, 128, 1)),
        Err(ConfigError::LineExceedsCache {
            line_bytes: 128,
            size_bytes: 64,
            ..
        })
    ));
}

#[test]
fn cache_beyond_address_space_rejected() {
    assert!(matches!(
        CacheLevel::new(&CacheConfig::new(1 << 33, 64, 1)),
        Err(ConfigError::CacheExceedsAddressSpace { size_bytes, .. }) if size_bytes == 1 << 33
    ));
    assert!(CacheLevel::new(&CacheConfig::new(1 << 20, 64, 1)).is_ok());
}

#[test]
fn single_line_cache_is_valid() {
    let mut cache = CacheLevel::new(&CacheConfig::new(64, 64, 1)).unwrap();
    assert_eq!(cache.num_lines(), 1);
    assert_eq!(cache.insert(Address::new(0x1000)), None);
    assert_eq!(cache.insert(Address::new(0x2000)), Some(Address::new(0x1000)));
}

// ══════════════════════════════════════════════════════════
// 5. Reconstruction properties
// ══════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn evicted_address_is_block_aligned_input(a in any::<u32>(), other_tag in any::<u32>()) {
        let mut cache = CacheLevel::new(&CacheConfig::new(32 * 1024, 64, 1)).unwrap();
        let a = Address::new(a);
        let tag_mask = (1u32 << 17) - 1;
        let b_tag = other_tag & tag_mask;
        prop_assume!(b_tag != cache.tag_of(a));
        let b = cache.line_address(cache.index_of(a), b_tag);

        prop_assert_eq!(cache.insert(a), None);
        prop_assert_eq!(cache.insert(b), Some(a.align_down(6)));
    }

    #[test]
    fn line_address_round_trips_index_and_tag(raw in any::<u32>()) {
        let cache = CacheLevel::new(&CacheConfig::new(2 * 1024 * 1024, 64, 30)).unwrap();
        let addr = Address::new(raw);
        let rebuilt = cache.line_address(cache.index_of(addr), cache.tag_of(addr));
        prop_assert_eq!(rebuilt, addr.align_down(cache.offset_bits()));
    }
}
