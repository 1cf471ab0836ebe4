//! Trade rejection and persistence error taxonomy

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors a buy/sell request can be rejected with.
///
/// Every variant except `Persistence` is raised before any state is
/// mutated; a rejected trade leaves cash and positions untouched.
#[derive(Error, Debug)]
pub enum TradeError {
    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("quantity must be a positive number of shares")]
    InvalidQuantity,

    #[error("insufficient funds: trade costs {required}, only {available} available")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient shares: tried to sell {requested}, holding {held}")]
    InsufficientShares { requested: u64, held: u64 },

    #[error("no current price available for {symbol}")]
    PriceUnavailable { symbol: String },

    /// The trade was applied in memory but could not be saved. The
    /// in-memory state is rolled back and the caller must be told the
    /// trade did not commit.
    #[error("wallet state could not be persisted: {0:#}")]
    Persistence(anyhow::Error),
}

impl TradeError {
    /// Stable machine-readable code, used by the HTTP API error body.
    pub fn code(&self) -> &'static str {
        match self {
            TradeError::UnknownSymbol { .. } => "unknown_symbol",
            TradeError::InvalidQuantity => "invalid_quantity",
            TradeError::InsufficientFunds { .. } => "insufficient_funds",
            TradeError::InsufficientShares { .. } => "insufficient_shares",
            TradeError::PriceUnavailable { .. } => "price_unavailable",
            TradeError::Persistence(_) => "persistence_failed",
        }
    }
}
