//! Address Mapper Unit Tests.
//!
//! Verifies both interleaving policies against the reference bit layouts,
//! geometry validation, and totality over the whole 32-bit address space.

use memlat_core::common::{Address, ConfigError};
use memlat_core::config::{DramConfig, MappingPolicy};
use memlat_core::memory::{AddressMapper, DramCoord, DramGeometry};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::row_address;

fn mapper(policy: MappingPolicy) -> AddressMapper {
    let config = DramConfig {
        mapping: policy,
        ..DramConfig::default()
    };
    AddressMapper::from_config(&config).unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Geometry
// ══════════════════════════════════════════════════════════

#[test]
fn default_geometry_uses_all_32_bits() {
    let g = DramGeometry::from_config(&DramConfig::default()).unwrap();
    assert_eq!(g.offset_bits, 2);
    assert_eq!(g.column_bits, 10);
    assert_eq!(g.bank_bits, 2);
    assert_eq!(g.row_bits, 18);
    assert_eq!(g.block_bits, 6);
    assert_eq!(g.offset_bits + g.column_bits + g.bank_bits + g.row_bits, 32);
    assert_eq!(g.total_rows(), 4 * 262_144);
}

#[test]
fn zero_banks_rejected() {
    let config = DramConfig {
        banks: 0,
        ..DramConfig::default()
    };
    assert_eq!(
        DramGeometry::from_config(&config),
        Err(ConfigError::Zero {
            what: "DRAM bank count"
        })
    );
}

#[test]
fn oversized_geometry_rejected() {
    let config = DramConfig {
        rows: 1 << 20,
        ..DramConfig::default()
    };
    assert_eq!(
        DramGeometry::from_config(&config),
        Err(ConfigError::GeometryTooWide { bits: 34 })
    );
}

#[test]
fn non_power_of_two_bus_rejected() {
    let config = DramConfig {
        bus_width: 3,
        ..DramConfig::default()
    };
    assert!(matches!(
        DramGeometry::from_config(&config),
        Err(ConfigError::NotPowerOfTwo { value: 3, .. })
    ));
}

#[test]
fn block_wider_than_row_rejected() {
    let config = DramConfig {
        columns: 4,
        ..DramConfig::default()
    };
    assert!(matches!(
        DramGeometry::from_config(&config),
        Err(ConfigError::BlockNotFoldable { block_bytes: 64, .. })
    ));
}

// ══════════════════════════════════════════════════════════
// 2. Row interleaving
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x0000_0000, DramCoord::new(0, 0, 0))]
#[case(0x0000_0004, DramCoord::new(0, 0, 1))]
#[case(0x0000_0FFC, DramCoord::new(0, 0, 1023))]
#[case(0x0000_1000, DramCoord::new(1, 0, 0))]
#[case(0x0000_4000, DramCoord::new(0, 1, 0))]
#[case(0x1234_5678, DramCoord::new(1, 18641, 414))]
#[case(0xFFFF_FFFF, DramCoord::new(3, 262_143, 1023))]
fn row_interleaving_layout(#[case] addr: u32, #[case] expected: DramCoord) {
    assert_eq!(mapper(MappingPolicy::RowInterleaved).map(Address::new(addr)), expected);
}

#[test]
fn row_interleaving_keeps_sequential_addresses_in_one_row() {
    let m = mapper(MappingPolicy::RowInterleaved);
    let first = m.map(Address::new(0x8000));
    for step in 1..1024 {
        let coord = m.map(Address::new(0x8000 + step * 4));
        assert_eq!((coord.bank, coord.row), (first.bank, first.row));
    }
}

#[test]
fn row_address_helper_matches_mapper() {
    let m = mapper(MappingPolicy::RowInterleaved);
    assert_eq!(m.map(row_address(2, 77, 300)), DramCoord::new(2, 77, 300));
    assert_eq!(m.row_of(row_address(3, 5, 0)), 5);
}

// ══════════════════════════════════════════════════════════
// 3. Cache block interleaving
// ══════════════════════════════════════════════════════════

#[test]
fn consecutive_blocks_rotate_across_banks() {
    let m = mapper(MappingPolicy::CacheBlockInterleaved);
    let banks: Vec<u32> = (0..8).map(|i| m.map(Address::new(i * 64)).bank).collect();
    assert_eq!(banks, vec![0, 1, 2, 3, 0, 1, 2, 3]);
}

#[test]
fn block_interleaving_keeps_a_block_in_one_bank_and_row() {
    let m = mapper(MappingPolicy::CacheBlockInterleaved);
    let columns: Vec<u32> = (0..16).map(|i| m.map(Address::new(0x40 + i * 4)).column).collect();
    assert_eq!(columns, (0..16).collect::<Vec<_>>());
    for i in 0..16 {
        let coord = m.map(Address::new(0x40 + i * 4));
        assert_eq!((coord.bank, coord.row), (1, 0));
    }
}

#[test]
fn block_interleaving_layout() {
    let m = mapper(MappingPolicy::CacheBlockInterleaved);
    assert_eq!(m.map(Address::new(0x100)), DramCoord::new(0, 0, 16));
    assert_eq!(m.map(Address::new(0x1234_5678)), DramCoord::new(1, 18641, 366));
    assert_eq!(m.map(Address::new(0xFFFF_FFFF)), DramCoord::new(3, 262_143, 1023));
}

#[test]
fn policies_agree_on_row() {
    let row = mapper(MappingPolicy::RowInterleaved);
    let block = mapper(MappingPolicy::CacheBlockInterleaved);
    for addr in [0u32, 0x40, 0x1000, 0xdead_beef, 0x8000_0000] {
        assert_eq!(row.row_of(Address::new(addr)), block.row_of(Address::new(addr)));
    }
}

// ══════════════════════════════════════════════════════════
// 4. Totality
// ══════════════════════════════════════════════════════════

fn odd_geometry(policy: MappingPolicy) -> AddressMapper {
    let config = DramConfig {
        banks: 3,
        rows: 1000,
        columns: 100,
        mapping: policy,
        ..DramConfig::default()
    };
    AddressMapper::from_config(&config).unwrap()
}

proptest! {
    #[test]
    fn every_address_maps_in_range(raw in any::<u32>()) {
        for policy in [MappingPolicy::RowInterleaved, MappingPolicy::CacheBlockInterleaved] {
            let m = mapper(policy);
            let coord = m.map(Address::new(raw));
            prop_assert!(m.geometry().contains(coord));
            prop_assert_eq!(coord, m.map(Address::new(raw)));
        }
    }

    #[test]
    fn non_power_of_two_dimensions_map_in_range(raw in any::<u32>()) {
        for policy in [MappingPolicy::RowInterleaved, MappingPolicy::CacheBlockInterleaved] {
            let m = odd_geometry(policy);
            let coord = m.map(Address::new(raw));
            prop_assert!(coord.bank < 3 && coord.row < 1000 && coord.column < 100);
        }
    }
}
