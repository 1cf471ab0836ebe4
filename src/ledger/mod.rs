//! Portfolio ledger: the accounting rules of simulated trading
//!
//! All validation happens before any mutation. A rejected trade leaves
//! cash, positions and history exactly as they were.

mod types;

pub use types::{LedgerSnapshot, LedgerState, Position, TradeAction, TradeRecord};

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::errors::TradeError;

impl LedgerState {
    /// Apply a buy at the given execution price.
    ///
    /// Debits cash, creates the position or folds the new shares into the
    /// volume-weighted average cost, and appends a record to the audit log.
    pub fn apply_buy(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<TradeRecord, TradeError> {
        if quantity == 0 {
            return Err(TradeError::InvalidQuantity);
        }
        let total = price * Decimal::from(quantity);
        if self.cash < total {
            return Err(TradeError::InsufficientFunds {
                required: total,
                available: self.cash,
            });
        }

        self.cash -= total;
        let now = Utc::now();
        match self.positions.get_mut(symbol) {
            Some(position) => {
                let old_shares = Decimal::from(position.shares);
                let new_shares = Decimal::from(position.shares + quantity);
                position.avg_price = (position.avg_price * old_shares + total) / new_shares;
                position.shares += quantity;
                position.updated_at = now;
            }
            None => {
                self.positions.insert(
                    symbol.to_string(),
                    Position {
                        symbol: symbol.to_string(),
                        shares: quantity,
                        avg_price: price,
                        opened_at: now,
                        updated_at: now,
                    },
                );
            }
        }

        let record = TradeRecord {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            action: TradeAction::Buy,
            quantity,
            price,
            executed_at: now,
        };
        debug!(symbol, quantity, %price, cash = %self.cash, "buy applied");
        self.history.push(record.clone());
        Ok(record)
    }

    /// Apply a sell at the given execution price.
    ///
    /// Credits cash and reduces the position; the average cost of the
    /// remaining shares is unchanged. A position sold down to zero shares
    /// is removed from the map, never stored empty.
    pub fn apply_sell(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<TradeRecord, TradeError> {
        if quantity == 0 {
            return Err(TradeError::InvalidQuantity);
        }
        let held = self.positions.get(symbol).map(|p| p.shares).unwrap_or(0);
        if held < quantity {
            return Err(TradeError::InsufficientShares {
                requested: quantity,
                held,
            });
        }

        let total = price * Decimal::from(quantity);
        self.cash += total;
        let now = Utc::now();

        let remaining = {
            let position = self
                .positions
                .get_mut(symbol)
                .expect("shares check guarantees the position exists");
            position.shares -= quantity;
            position.updated_at = now;
            position.shares
        };
        if remaining == 0 {
            self.positions.remove(symbol);
        }

        let record = TradeRecord {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            action: TradeAction::Sell,
            quantity,
            price,
            executed_at: now,
        };
        debug!(symbol, quantity, %price, cash = %self.cash, "sell applied");
        self.history.push(record.clone());
        Ok(record)
    }

    /// Immutable copy of the current cash and positions
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            cash: self.cash,
            positions: self.positions.clone(),
            trade_count: self.history.len(),
            taken_at: Utc::now(),
        }
    }
}
