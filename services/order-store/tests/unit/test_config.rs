//! Configuration loading and its effect on store construction

use order_store::{ConcurrentOrderStore, SnapshotStrategy, StoreConfig};
use std::io::Write;

#[test]
fn defaults_are_strict_per_symbol() {
    let config = StoreConfig::default();
    assert_eq!(config.snapshot_strategy, SnapshotStrategy::PerSymbol);
    assert!(config.validate_orders);
    assert!(config.track_latency);
}

#[test]
fn json_round_trip_through_file() {
    let config = StoreConfig {
        snapshot_strategy: SnapshotStrategy::Global,
        validate_orders: false,
        track_latency: false,
    };

    let path = std::env::temp_dir().join(format!("order-store-config-{}.json", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(serde_json::to_string(&config).unwrap().as_bytes())
            .unwrap();
    }

    let loaded = StoreConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_file_is_an_error() {
    let err = StoreConfig::load("/nonexistent/order-store.json").unwrap_err();
    assert!(err.to_string().contains("Failed to read config"));
}

#[test]
fn latency_tracking_can_be_disabled() {
    let store = ConcurrentOrderStore::with_config(StoreConfig {
        track_latency: false,
        ..StoreConfig::default()
    });
    store.insert("TCS", 1, 1).unwrap();
    store.enumerate();

    let metrics = store.metrics();
    assert_eq!(metrics.inserts, 1);
    assert!(metrics.latency_stats.insert.is_none());
    assert!(metrics.latency_stats.snapshot.is_none());
}

#[test]
fn report_mentions_counters() {
    let store = ConcurrentOrderStore::new();
    store.insert("TCS", 1, 1).unwrap();
    store.insert("TCS", 1, 1).unwrap();
    let _ = store.remove("INFY");

    let report = store.metrics().format_report();
    assert!(report.contains("Inserts: 2 (1 new levels, 1 aggregated, 0 rejected)"));
    assert!(report.contains("Removals: 0 (1 not found)"));
    assert!(report.contains("Insert Latency"));
}
