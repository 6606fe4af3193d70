//! Error types for store operations

use crate::types::{LotSize, Price};
use thiserror::Error;

/// Errors reported by [`ConcurrentOrderStore`](crate::ConcurrentOrderStore)
///
/// None of these are fatal: the store state is unchanged whenever one is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// `remove` on a symbol that currently holds no orders
    #[error("Symbol {0} not found for removal")]
    SymbolNotFound(String),

    /// Order violates the input contract (`lot_size > 0`, `price >= 0`)
    #[error("Invalid order for {symbol}: lot size {lot_size}, price {price}")]
    InvalidOrder {
        /// Target symbol
        symbol: String,
        /// Offending lot size
        lot_size: LotSize,
        /// Offending price
        price: Price,
    },

    /// Empty symbol identifier
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// Aggregated lot size does not fit in an `i64`
    #[error("Lot size overflow aggregating {symbol} at price {price}")]
    LotSizeOverflow {
        /// Target symbol
        symbol: String,
        /// Price level that would overflow
        price: Price,
    },
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
