//! Per-symbol reader/writer locks, created lazily and exactly once
//!
//! The registry hands out one [`SymbolLock`] per symbol. Each lock owns the
//! symbol's table slot, so the table can only be reached through a guard of
//! the lock that protects it.
//!
//! Creation goes through a registry-wide coordination lock that is held
//! only for the check-then-insert step and released before the caller
//! touches the returned handle. Entries are never removed: a thread that
//! has just obtained a handle can always lock it, even if the symbol's
//! orders are removed in between. The cost is that the registry grows with
//! the number of distinct symbols ever seen.

use crate::types::{PriceLevelTable, Symbol};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Contents guarded by a symbol lock. `None` means the symbol currently has
/// no orders (never inserted, or removed).
pub type SymbolSlot = Option<PriceLevelTable>;

/// Shared handle to one symbol's lock
///
/// Cloning is cheap and yields a handle to the same lock.
#[derive(Clone)]
pub struct SymbolLock {
    symbol: Arc<str>,
    slot: Arc<RwLock<SymbolSlot>>,
}

impl SymbolLock {
    fn new(symbol: &str) -> Self {
        Self {
            symbol: Arc::from(symbol),
            slot: Arc::new(RwLock::new(None)),
        }
    }

    /// Symbol this lock guards
    #[inline]
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Acquire the lock in shared mode
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, SymbolSlot> {
        self.slot.read()
    }

    /// Acquire the lock in exclusive mode.
    ///
    /// Do not call into the owning store from the same thread while the
    /// guard is alive: creating a new symbol may wait for a snapshot that
    /// is itself waiting for this guard.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, SymbolSlot> {
        self.slot.write()
    }

    /// True if both handles refer to the same underlying lock
    #[inline]
    #[must_use]
    pub fn same_lock(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for SymbolLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolLock")
            .field("symbol", &self.symbol)
            .field("locked", &self.slot.is_locked())
            .finish()
    }
}

/// Mapping from symbol to its lock, ordered by symbol
#[derive(Default)]
pub struct SymbolLockRegistry {
    locks: RwLock<BTreeMap<Symbol, SymbolLock>>,
}

impl SymbolLockRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the lock for `symbol`, creating it if absent.
    ///
    /// Concurrent first calls for the same symbol all receive the same lock.
    pub fn acquire_or_create(&self, symbol: &str) -> SymbolLock {
        // Fast path: lock already exists
        if let Some(lock) = self.locks.read().get(symbol) {
            return lock.clone();
        }

        // Re-check under the exclusive guard; another caller may have won
        let mut locks = self.locks.write();
        locks
            .entry(symbol.to_owned())
            .or_insert_with(|| {
                tracing::debug!(symbol, "creating symbol lock");
                SymbolLock::new(symbol)
            })
            .clone()
    }

    /// Return the lock for `symbol` if one was ever created
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<SymbolLock> {
        self.locks.read().get(symbol).cloned()
    }

    /// Handles to every lock, in ascending symbol order.
    ///
    /// The registry guard is released before returning; locks created
    /// afterwards are not included.
    #[must_use]
    pub fn handles(&self) -> Vec<SymbolLock> {
        self.locks.read().values().cloned().collect()
    }

    /// Hold the registry in shared mode, blocking creation of new locks
    /// until the guard is dropped. Symbol locks may be taken while it is
    /// held; callers of `acquire_or_create` never hold a symbol lock.
    pub(crate) fn entries(&self) -> RwLockReadGuard<'_, BTreeMap<Symbol, SymbolLock>> {
        self.locks.read()
    }

    /// Number of locks ever created
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.read().len()
    }

    /// True if no lock has been created yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.read().is_empty()
    }
}

impl fmt::Debug for SymbolLockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolLockRegistry")
            .field("symbols", &self.len())
            .finish()
    }
}
