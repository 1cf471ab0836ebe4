//! Ledger type definitions with strong typing

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
        }
    }
}

/// One executed trade, appended to the audit log and never rewritten
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: u64,
    /// Execution price per share
    pub price: Decimal,
    pub executed_at: DateTime<Utc>,
}

impl TradeRecord {
    /// Total cash moved by this trade
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An open holding in one symbol
///
/// Exists only while `shares > 0`; a position sold down to zero is
/// removed from the ledger entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub shares: u64,
    /// Volume-weighted average cost per share of the shares still held.
    /// Unchanged by sells; only buys re-average it.
    pub avg_price: Decimal,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Cost basis of the whole position
    pub fn cost_value(&self) -> Decimal {
        self.avg_price * Decimal::from(self.shares)
    }
}

/// The authoritative record of cash and open positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerState {
    pub cash: Decimal,
    /// Keyed by symbol; BTreeMap gives the report deterministic
    /// ascending-symbol iteration order.
    pub positions: BTreeMap<String, Position>,
    /// Append-only audit log of executed trades
    pub history: Vec<TradeRecord>,
}

impl LedgerState {
    /// Fresh ledger with the starting cash balance and no holdings
    pub fn new(starting_cash: Decimal) -> Self {
        Self {
            cash: starting_cash,
            positions: BTreeMap::new(),
            history: Vec::new(),
        }
    }
}

/// Immutable point-in-time copy of the ledger, handed to the valuation
/// engine and the presentation layer. No references into the live state
/// escape the wallet service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub cash: Decimal,
    pub positions: BTreeMap<String, Position>,
    pub trade_count: usize,
    pub taken_at: DateTime<Utc>,
}
