//! Symbol-partitioned order store
//!
//! Every symbol has its own reader/writer lock, obtained from the
//! [`SymbolLockRegistry`]. Inserts and removes take only that symbol's lock
//! in exclusive mode, so work on different symbols runs in parallel and
//! work on one symbol is serialized (no lost aggregation updates).
//!
//! `enumerate` produces a view that held at a single instant:
//! - [`SnapshotStrategy::PerSymbol`] takes every symbol lock in shared mode,
//!   in ascending symbol order, and copies while all of them are held. The
//!   registry is held shared for the same span, so no symbol appears
//!   mid-copy. Mutators hold at most one symbol lock, never wait for a
//!   second one, and only touch the registry before taking their symbol
//!   lock, so the fixed order rules out lock cycles.
//! - [`SnapshotStrategy::Global`] uses a store-wide gate. Mutators hold it
//!   shared for their whole critical section and the snapshot holds it
//!   exclusively while copying. Gate before symbol lock, always.

use crate::config::{SnapshotStrategy, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::metrics::{MetricsSnapshot, StoreMetrics};
use crate::registry::SymbolLockRegistry;
use crate::snapshot::{StoreSnapshot, SymbolSnapshot};
use crate::types::{Aggregation, LotSize, Order, Price, PriceLevelTable};
use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

/// Concurrent mapping `symbol -> price -> aggregated order`
///
/// Construct one per use and share it by reference or `Arc`.
pub struct ConcurrentOrderStore {
    registry: SymbolLockRegistry,
    snapshot_gate: RwLock<()>,
    config: StoreConfig,
    metrics: StoreMetrics,
}

impl Default for ConcurrentOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentOrderStore {
    /// Create an empty store with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given configuration
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            registry: SymbolLockRegistry::new(),
            snapshot_gate: RwLock::new(()),
            metrics: StoreMetrics::new(config.track_latency),
            config,
        }
    }

    /// Active configuration
    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Lock registry backing this store
    #[inline]
    pub fn registry(&self) -> &SymbolLockRegistry {
        &self.registry
    }

    /// Insert `lot_size` lots at `price` for `symbol`, aggregating into an
    /// existing level at the same price.
    pub fn insert(&self, symbol: &str, lot_size: LotSize, price: Price) -> StoreResult<()> {
        self.insert_order(symbol, Order::new(lot_size, price)).map(|_| ())
    }

    /// Insert `order` for `symbol` and report whether a level was opened or
    /// aggregated.
    pub fn insert_order(&self, symbol: &str, order: Order) -> StoreResult<Aggregation> {
        let started = self.metrics.start();

        if let Err(e) = self.validate(symbol, &order) {
            warn!(symbol, lot_size = order.lot_size, price = order.price, "rejecting order: {e}");
            self.metrics.record_rejected();
            return Err(e);
        }

        let lock = self.registry.acquire_or_create(symbol);
        let outcome = {
            let _gate = self.mutation_gate();
            let mut slot = lock.write();
            slot.get_or_insert_with(PriceLevelTable::new).aggregate(order)
        };

        match outcome {
            Some(Aggregation::NewLevel) => {
                debug!(symbol, lot_size = order.lot_size, price = order.price, "opened price level");
                self.metrics.record_new_level(started);
                Ok(Aggregation::NewLevel)
            }
            Some(Aggregation::Aggregated(total)) => {
                debug!(symbol, lot_size = total, price = order.price, "aggregated price level");
                self.metrics.record_aggregation(started);
                Ok(Aggregation::Aggregated(total))
            }
            None => {
                warn!(symbol, price = order.price, "lot size overflow, order rejected");
                self.metrics.record_rejected();
                Err(StoreError::LotSizeOverflow {
                    symbol: symbol.to_owned(),
                    price: order.price,
                })
            }
        }
    }

    /// Remove every price level of `symbol`.
    ///
    /// Returns the number of levels dropped. The symbol's lock stays in the
    /// registry.
    pub fn remove(&self, symbol: &str) -> StoreResult<usize> {
        let started = self.metrics.start();

        // A symbol without a lock has never held orders; do not grow the
        // registry for misses.
        let removed = self.registry.get(symbol).and_then(|lock| {
            let _gate = self.mutation_gate();
            let table = lock.write().take();
            table
        });

        match removed {
            Some(table) => {
                info!(symbol, levels = table.len(), "Removed orders for symbol {symbol}");
                self.metrics.record_remove(true, started);
                Ok(table.len())
            }
            None => {
                warn!(symbol, "Symbol {symbol} not found for removal");
                self.metrics.record_remove(false, started);
                Err(StoreError::SymbolNotFound(symbol.to_owned()))
            }
        }
    }

    /// Consistent view of every symbol and its price levels.
    ///
    /// Symbols are ascending lexicographically and levels ascending by price.
    pub fn enumerate(&self) -> StoreSnapshot {
        let started = self.metrics.start();

        let snapshot = match self.config.snapshot_strategy {
            SnapshotStrategy::PerSymbol => self.snapshot_per_symbol(),
            SnapshotStrategy::Global => self.snapshot_global(),
        };

        debug!(symbols = snapshot.len(), "enumerated store");
        self.metrics.record_snapshot(started);
        snapshot
    }

    /// True if `symbol` currently holds at least one price level
    pub fn contains(&self, symbol: &str) -> bool {
        match self.registry.get(symbol) {
            Some(lock) => lock.read().is_some(),
            None => false,
        }
    }

    /// Price levels of one symbol, ascending by price
    pub fn price_levels(&self, symbol: &str) -> Option<Vec<Order>> {
        let lock = self.registry.get(symbol)?;
        let slot = lock.read();
        slot.as_ref()
            .map(|table| table.iter().map(|(_, order)| *order).collect())
    }

    /// Number of symbols currently holding orders
    pub fn symbol_count(&self) -> usize {
        self.registry
            .handles()
            .iter()
            .filter(|lock| lock.read().is_some())
            .count()
    }

    /// Number of symbol locks ever created, including inert ones
    pub fn registered_symbols(&self) -> usize {
        self.registry.len()
    }

    /// Current operation counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.get_snapshot()
    }

    fn validate(&self, symbol: &str, order: &Order) -> StoreResult<()> {
        if symbol.is_empty() {
            return Err(StoreError::InvalidSymbol(symbol.to_owned()));
        }
        if self.config.validate_orders && !order.is_well_formed() {
            return Err(StoreError::InvalidOrder {
                symbol: symbol.to_owned(),
                lot_size: order.lot_size,
                price: order.price,
            });
        }
        Ok(())
    }

    /// Shared hold on the snapshot gate, only under the global strategy
    #[inline]
    fn mutation_gate(&self) -> Option<RwLockReadGuard<'_, ()>> {
        match self.config.snapshot_strategy {
            SnapshotStrategy::Global => Some(self.snapshot_gate.read()),
            SnapshotStrategy::PerSymbol => None,
        }
    }

    fn snapshot_per_symbol(&self) -> StoreSnapshot {
        // Registry stays shared until the copy is done, so no symbol can be
        // created between listing the locks and reading them
        let registry = self.registry.entries();

        // Ascending symbol order; every guard is held until the copy is done
        let guards: Vec<_> = registry
            .values()
            .map(|lock| (lock.symbol(), lock.read()))
            .collect();

        let symbols = guards
            .iter()
            .filter_map(|(symbol, slot)| {
                slot.as_ref()
                    .map(|table| SymbolSnapshot::from_table(symbol, table))
            })
            .collect();

        drop(guards);
        drop(registry);
        StoreSnapshot { symbols }
    }

    fn snapshot_global(&self) -> StoreSnapshot {
        let _gate = self.snapshot_gate.write();

        // No mutator is inside its critical section while the gate is held
        let symbols = self
            .registry
            .handles()
            .iter()
            .filter_map(|lock| {
                lock.read()
                    .as_ref()
                    .map(|table| SymbolSnapshot::from_table(lock.symbol(), table))
            })
            .collect();

        StoreSnapshot { symbols }
    }
}

impl std::fmt::Debug for ConcurrentOrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentOrderStore")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
