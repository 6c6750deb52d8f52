//! Configuration Unit Tests.
//!
//! Verifies the reference defaults, partial JSON overrides, enum aliases, and
//! that invalid geometry is rejected before any structure is built.

use std::io::Write;

use memlat_core::common::ConfigError;
use memlat_core::config::{CacheConfig, Config, MappingPolicy, SchedulePolicy};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn defaults_match_reference_platform() {
    let config = Config::default();

    assert_eq!(config.cache.l1, CacheConfig::new(32 * 1024, 64, 1));
    assert_eq!(config.cache.l2, CacheConfig::new(32 * 1024, 64, 6));
    assert_eq!(config.cache.l3, CacheConfig::new(2 * 1024 * 1024, 64, 30));
    assert_eq!(config.cache.l1.num_lines(), 512);

    assert_eq!(config.dram.banks, 4);
    assert_eq!(config.dram.rows, 262_144);
    assert_eq!(config.dram.columns, 1024);
    assert_eq!(config.dram.bus_width, 4);
    assert_eq!(
        (config.dram.t_ras, config.dram.t_cas, config.dram.t_pre),
        (100, 50, 50)
    );
    assert_eq!(config.dram.mapping, MappingPolicy::RowInterleaved);
    assert!(!config.dram.track_row_capacity);

    assert_eq!(config.scheduler.policy, SchedulePolicy::Fcfs);
    assert_eq!(config.scheduler.queue_capacity, 32);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn empty_object_gives_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.cache.l3, Config::default().cache.l3);
    assert_eq!(config.dram, Config::default().dram);
    assert_eq!(config.scheduler, Config::default().scheduler);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let json = r#"{
        "cache": { "l2": { "size_bytes": 65536, "latency": 8 } },
        "dram": { "banks": 2, "track_row_capacity": true }
    }"#;
    let config = Config::from_json(json).unwrap();

    assert_eq!(config.cache.l1, Config::default().cache.l1);
    assert_eq!(config.cache.l2, CacheConfig::new(65536, 64, 8));
    assert_eq!(config.dram.banks, 2);
    assert_eq!(config.dram.rows, 262_144);
    assert!(config.dram.track_row_capacity);
}

#[test]
fn single_cache_field_keeps_that_levels_defaults() {
    let size_only = Config::from_json(r#"{ "cache": { "l1": { "size_bytes": 65536 } } }"#).unwrap();
    assert_eq!(size_only.cache.l1, CacheConfig::new(65536, 64, 1));

    let latency_only = Config::from_json(r#"{ "cache": { "l3": { "latency": 40 } } }"#).unwrap();
    assert_eq!(latency_only.cache.l3, CacheConfig::new(2 * 1024 * 1024, 64, 40));
    assert_eq!(latency_only.cache.l2, CacheConfig::new(32 * 1024, 64, 6));

    let line_only = Config::from_json(r#"{ "cache": { "l2": { "line_bytes": 128 } } }"#).unwrap();
    assert_eq!(line_only.cache.l2, CacheConfig::new(32 * 1024, 128, 6));

    let empty_level = Config::from_json(r#"{ "cache": { "l2": {} } }"#).unwrap();
    assert_eq!(empty_level.cache.l2, Config::default().cache.l2);
}

#[rstest]
#[case("RowInterleaved", MappingPolicy::RowInterleaved)]
#[case("row", MappingPolicy::RowInterleaved)]
#[case("CacheBlockInterleaved", MappingPolicy::CacheBlockInterleaved)]
#[case("block", MappingPolicy::CacheBlockInterleaved)]
fn mapping_aliases(#[case] name: &str, #[case] expected: MappingPolicy) {
    let json = format!(r#"{{ "dram": {{ "mapping": "{name}" }} }}"#);
    assert_eq!(Config::from_json(&json).unwrap().dram.mapping, expected);
}

#[rstest]
#[case("Fcfs", SchedulePolicy::Fcfs)]
#[case("fcfs", SchedulePolicy::Fcfs)]
#[case("RowConflictMinimizing", SchedulePolicy::RowConflictMinimizing)]
#[case("row", SchedulePolicy::RowConflictMinimizing)]
fn scheduler_aliases(#[case] name: &str, #[case] expected: SchedulePolicy) {
    let json = format!(r#"{{ "scheduler": {{ "policy": "{name}" }} }}"#);
    assert_eq!(Config::from_json(&json).unwrap().scheduler.policy, expected);
}

#[rstest]
#[case(r#"{ "cache": { "l1": { "size_bytes": "big" } } }"#)]
#[case(r#"{ "dram": { "mapping": "diagonal" } }"#)]
#[case(r#"{ "dram": { "banks": -1 } }"#)]
#[case("not json")]
fn malformed_json_is_a_parse_error(#[case] json: &str) {
    assert!(matches!(Config::from_json(json), Err(ConfigError::Parse(_))));
}

#[test]
fn invalid_values_fail_validation() {
    assert_eq!(
        Config::from_json(r#"{ "cache": { "l1": { "size_bytes": 0, "latency": 1 } } }"#)
            .unwrap_err(),
        ConfigError::Zero { what: "cache size" }
    );
    assert_eq!(
        Config::from_json(r#"{ "scheduler": { "queue_capacity": 0 } }"#).unwrap_err(),
        ConfigError::Zero {
            what: "scheduler queue capacity"
        }
    );
    assert_eq!(
        Config::from_json(r#"{ "dram": { "rows": 1048576 } }"#).unwrap_err(),
        ConfigError::GeometryTooWide { bits: 34 }
    );
    assert_eq!(
        Config::from_json(r#"{ "cache": { "l3": { "size_bytes": 8589934592 } } }"#).unwrap_err(),
        ConfigError::CacheExceedsAddressSpace {
            level: "L3",
            size_bytes: 1 << 33
        }
    );
    assert!(matches!(
        Config::from_json(r#"{ "dram": { "bus_width": 3 } }"#),
        Err(ConfigError::NotPowerOfTwo { value: 3, .. })
    ));
}

#[test]
fn from_file_reads_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "scheduler": {{ "policy": "row", "queue_capacity": 4 }} }}"#).unwrap();
    file.flush().unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.scheduler.policy, SchedulePolicy::RowConflictMinimizing);
    assert_eq!(config.scheduler.queue_capacity, 4);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::Io { path: p, .. }) if p == path
    ));
}
