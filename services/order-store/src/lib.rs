//! # Concurrent Order Store
//!
//! In-memory store that aggregates orders by instrument symbol and price
//! level. Locking is partitioned per symbol:
//!
//! - Inserts on different symbols never contend on a shared lock
//! - Inserts on the same symbol are serialized, so aggregation at a price
//!   level never loses an update
//! - Enumeration returns a point-in-time view across all symbols
//!
//! ```
//! use order_store::ConcurrentOrderStore;
//!
//! let store = ConcurrentOrderStore::new();
//! store.insert("NESTLEIND", 10, 2).unwrap();
//! store.insert("NESTLEIND", 20, 2).unwrap();
//!
//! let snapshot = store.enumerate();
//! assert_eq!(snapshot.get("NESTLEIND").unwrap().lot_size_at(2), Some(30));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use crate::config::{SnapshotStrategy, StoreConfig};
pub use crate::error::{StoreError, StoreResult};
pub use crate::metrics::{MetricsSnapshot, StoreMetrics};
pub use crate::registry::{SymbolLock, SymbolLockRegistry};
pub use crate::snapshot::{StoreSnapshot, SymbolSnapshot};
pub use crate::store::ConcurrentOrderStore;
pub use crate::types::{Aggregation, LotSize, Order, Price, PriceLevelTable, Symbol};
