//! Unit tests for single-threaded store behaviour
//!
//! Tests cover:
//! - Aggregation at an existing price level
//! - Distinct price levels for one symbol
//! - Removal and the not-found condition
//! - Input validation and overflow
//! - Snapshot ordering and rendering

use crate::utils::{SAMPLE_SYMBOLS, seeded_store, store_with};
use order_store::{Aggregation, ConcurrentOrderStore, Order, SnapshotStrategy, StoreConfig, StoreError};
use rstest::rstest;

#[rstest]
#[case::per_symbol(SnapshotStrategy::PerSymbol)]
#[case::global(SnapshotStrategy::Global)]
fn same_price_aggregates(#[case] strategy: SnapshotStrategy) {
    let store = store_with(strategy);
    store.insert("X", 10, 2).unwrap();
    store.insert("X", 20, 2).unwrap();

    let snapshot = store.enumerate();
    let x = snapshot.get("X").unwrap();
    assert_eq!(x.levels, vec![Order::new(30, 2)]);
}

#[rstest]
#[case::per_symbol(SnapshotStrategy::PerSymbol)]
#[case::global(SnapshotStrategy::Global)]
fn distinct_prices_coexist(#[case] strategy: SnapshotStrategy) {
    let store = store_with(strategy);
    store.insert("X", 10, 2).unwrap();
    store.insert("X", 15, 4).unwrap();

    let levels = store.price_levels("X").unwrap();
    assert_eq!(levels, vec![Order::new(10, 2), Order::new(15, 4)]);
}

#[test]
fn insert_order_reports_outcome() {
    let store = ConcurrentOrderStore::new();
    assert_eq!(store.insert_order("TCS", Order::new(5, 100)), Ok(Aggregation::NewLevel));
    assert_eq!(
        store.insert_order("TCS", Order::new(7, 100)),
        Ok(Aggregation::Aggregated(12))
    );
    assert_eq!(store.insert_order("TCS", Order::new(1, 101)), Ok(Aggregation::NewLevel));
}

#[rstest]
#[case::per_symbol(SnapshotStrategy::PerSymbol)]
#[case::global(SnapshotStrategy::Global)]
fn remove_clears_every_level(#[case] strategy: SnapshotStrategy) {
    let store = store_with(strategy);
    store.insert("X", 10, 2).unwrap();
    store.insert("X", 15, 4).unwrap();

    assert_eq!(store.remove("X"), Ok(2));
    assert!(!store.contains("X"));
    assert!(!store.enumerate().contains("X"));
    assert!(store.price_levels("X").is_none());
}

#[test]
fn remove_missing_symbol_is_reported() {
    let store = seeded_store(SnapshotStrategy::PerSymbol);
    let before = store.enumerate();

    assert_eq!(
        store.remove("NONEXISTENT"),
        Err(StoreError::SymbolNotFound("NONEXISTENT".into()))
    );
    assert_eq!(store.enumerate(), before);
}

#[test]
fn second_remove_is_not_found() {
    let store = seeded_store(SnapshotStrategy::PerSymbol);
    assert!(store.remove("TCS").is_ok());
    assert_eq!(store.remove("TCS"), Err(StoreError::SymbolNotFound("TCS".into())));
    assert_eq!(store.symbol_count(), SAMPLE_SYMBOLS.len() - 1);
}

#[test]
fn remove_keeps_lock_and_allows_reinsert() {
    let store = ConcurrentOrderStore::new();
    store.insert("LT", 10, 2).unwrap();
    let lock_before = store.registry().get("LT").unwrap();

    store.remove("LT").unwrap();
    assert_eq!(store.registered_symbols(), 1);

    store.insert("LT", 3, 9).unwrap();
    let lock_after = store.registry().get("LT").unwrap();
    assert!(lock_before.same_lock(&lock_after));
    assert_eq!(store.price_levels("LT").unwrap(), vec![Order::new(3, 9)]);
}

#[test]
fn remove_miss_does_not_register_symbol() {
    let store = ConcurrentOrderStore::new();
    let _ = store.remove("GHOST");
    assert_eq!(store.registered_symbols(), 0);
}

#[rstest]
#[case::zero_lots(0, 5)]
#[case::negative_lots(-3, 5)]
#[case::negative_price(4, -1)]
fn invalid_orders_rejected(#[case] lot_size: i64, #[case] price: i64) {
    let store = ConcurrentOrderStore::new();
    let err = store.insert("INFY", lot_size, price).unwrap_err();
    assert_eq!(
        err,
        StoreError::InvalidOrder {
            symbol: "INFY".into(),
            lot_size,
            price,
        }
    );
    assert!(!store.contains("INFY"));
    assert_eq!(store.metrics().rejected_orders, 1);
}

#[test]
fn permissive_mode_accepts_unchecked_orders() {
    let store = ConcurrentOrderStore::with_config(StoreConfig {
        validate_orders: false,
        ..StoreConfig::default()
    });
    store.insert("INFY", 0, -1).unwrap();
    assert_eq!(store.price_levels("INFY").unwrap(), vec![Order::new(0, -1)]);
}

#[test]
fn empty_symbol_rejected() {
    let store = ConcurrentOrderStore::new();
    assert_eq!(store.insert("", 1, 1), Err(StoreError::InvalidSymbol(String::new())));
    assert_eq!(store.registered_symbols(), 0);
}

#[test]
fn overflow_leaves_level_unchanged() {
    let store = ConcurrentOrderStore::new();
    store.insert("SBIN", i64::MAX, 1).unwrap();
    assert_eq!(
        store.insert("SBIN", 1, 1),
        Err(StoreError::LotSizeOverflow {
            symbol: "SBIN".into(),
            price: 1,
        })
    );
    assert_eq!(store.price_levels("SBIN").unwrap(), vec![Order::new(i64::MAX, 1)]);
}

#[test]
fn snapshot_is_ordered_by_symbol_then_price() {
    let store = ConcurrentOrderStore::new();
    store.insert("TCS", 1, 30).unwrap();
    store.insert("INFY", 1, 20).unwrap();
    store.insert("TCS", 1, 10).unwrap();
    store.insert("BAJFINANCE", 1, 5).unwrap();

    let snapshot = store.enumerate();
    let symbols: Vec<_> = snapshot.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BAJFINANCE", "INFY", "TCS"]);

    let tcs_prices: Vec<_> = snapshot.get("TCS").unwrap().levels.iter().map(|o| o.price).collect();
    assert_eq!(tcs_prices, vec![10, 30]);
}

#[test]
fn sample_session_renders_like_reference() {
    let store = seeded_store(SnapshotStrategy::PerSymbol);
    store.insert("NESTLEIND", 20, 2).unwrap();
    store.insert("HDFCBANK", 15, 4).unwrap();

    let rendered = store.enumerate().to_string();
    assert!(rendered.contains("NESTLEIND: {lotSize: 30, price: 2} \n"));
    assert!(rendered.contains("HDFCBANK: {lotSize: 10, price: 2} {lotSize: 15, price: 4} \n"));
    assert_eq!(rendered.lines().count(), SAMPLE_SYMBOLS.len());

    store.remove("NESTLEIND").unwrap();
    let rendered = store.enumerate().to_string();
    assert!(!rendered.contains("NESTLEIND"));
    assert_eq!(rendered.lines().count(), SAMPLE_SYMBOLS.len() - 1);
}

#[test]
fn enumerate_does_not_mutate() {
    let store = seeded_store(SnapshotStrategy::Global);
    let first = store.enumerate();
    let second = store.enumerate();
    assert_eq!(first, second);
    assert_eq!(store.metrics().snapshots, 2);
}

#[test]
fn independent_stores_do_not_share_state() {
    let a = ConcurrentOrderStore::new();
    let b = ConcurrentOrderStore::new();
    a.insert("TCS", 1, 1).unwrap();
    assert!(a.contains("TCS"));
    assert!(!b.contains("TCS"));
    assert!(b.enumerate().is_empty());
}
