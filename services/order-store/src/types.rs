//! Value types held by the store
//!
//! An [`Order`] is a plain `(lot_size, price)` pair. Orders for one symbol
//! live in a [`PriceLevelTable`], keyed by price, where a second order at an
//! existing price is folded into the resting one instead of being stored
//! next to it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Instrument identifier (ticker)
pub type Symbol = String;

/// Price in integer ticks
pub type Price = i64;

/// Quantity in lots
pub type LotSize = i64;

/// A resting order at one price level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Number of lots
    pub lot_size: LotSize,
    /// Price of the level
    pub price: Price,
}

impl Order {
    /// Create a new order
    #[inline]
    #[must_use]
    pub const fn new(lot_size: LotSize, price: Price) -> Self {
        Self { lot_size, price }
    }

    /// Whether the order satisfies the input contract (`lot_size > 0`, `price >= 0`)
    #[inline]
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.lot_size > 0 && self.price >= 0
    }

    /// Two orders share a price level iff their prices are equal
    #[inline]
    #[must_use]
    pub const fn same_level(&self, other: &Self) -> bool {
        self.price == other.price
    }
}

/// Result of folding an order into a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// A new price level was opened
    NewLevel,
    /// The order was added onto an existing level; carries the new total
    Aggregated(LotSize),
}

/// Per-symbol mapping from price to the aggregated order at that price
///
/// Iteration is in ascending price order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceLevelTable {
    levels: BTreeMap<Price, Order>,
}

impl PriceLevelTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `order` into the table.
    ///
    /// Returns `None` when the aggregated lot size would overflow, in which
    /// case the table is left untouched.
    pub fn aggregate(&mut self, order: Order) -> Option<Aggregation> {
        match self.levels.entry(order.price) {
            Entry::Occupied(mut slot) => {
                let resting = slot.get_mut();
                let total = resting.lot_size.checked_add(order.lot_size)?;
                *resting = Order::new(total, order.price);
                Some(Aggregation::Aggregated(total))
            }
            Entry::Vacant(slot) => {
                slot.insert(order);
                Some(Aggregation::NewLevel)
            }
        }
    }

    /// Order resting at `price`, if any
    #[inline]
    #[must_use]
    pub fn get(&self, price: Price) -> Option<&Order> {
        self.levels.get(&price)
    }

    /// Number of price levels
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True when no level is present
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterate levels in ascending price order
    pub fn iter(&self) -> impl Iterator<Item = (&Price, &Order)> {
        self.levels.iter()
    }
}
