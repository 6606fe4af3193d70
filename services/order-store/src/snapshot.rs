//! Point-in-time views produced by `enumerate`

use crate::types::{LotSize, Order, Price, PriceLevelTable, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price levels of one symbol, ascending by price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    /// Instrument
    pub symbol: Symbol,
    /// Aggregated orders, one per price, ascending by price
    pub levels: Vec<Order>,
}

impl SymbolSnapshot {
    pub(crate) fn from_table(symbol: &str, table: &PriceLevelTable) -> Self {
        Self {
            symbol: symbol.to_owned(),
            levels: table.iter().map(|(_, order)| *order).collect(),
        }
    }

    /// Aggregated lot size resting at `price`
    #[must_use]
    pub fn lot_size_at(&self, price: Price) -> Option<LotSize> {
        self.levels
            .binary_search_by_key(&price, |o| o.price)
            .ok()
            .map(|idx| self.levels[idx].lot_size)
    }

    /// Sum of lot sizes over every level
    #[must_use]
    pub fn total_lots(&self) -> i128 {
        self.levels.iter().map(|o| i128::from(o.lot_size)).sum()
    }
}

impl fmt::Display for SymbolSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.symbol)?;
        for order in &self.levels {
            write!(f, "{{lotSize: {}, price: {}}} ", order.lot_size, order.price)?;
        }
        Ok(())
    }
}

/// Consistent view of the whole store, ascending by symbol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Symbols holding at least one order
    pub symbols: Vec<SymbolSnapshot>,
}

impl StoreSnapshot {
    /// Levels for `symbol`, if present
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&SymbolSnapshot> {
        self.symbols
            .binary_search_by(|s| s.symbol.as_str().cmp(symbol))
            .ok()
            .map(|idx| &self.symbols[idx])
    }

    /// True if `symbol` is present
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    /// Number of symbols
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if the store held no orders
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate symbols in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &SymbolSnapshot> {
        self.symbols.iter()
    }

    /// Sum of lot sizes across every symbol
    #[must_use]
    pub fn total_lots(&self) -> i128 {
        self.symbols.iter().map(SymbolSnapshot::total_lots).sum()
    }
}

impl fmt::Display for StoreSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            writeln!(f, "{symbol}")?;
        }
        Ok(())
    }
}
