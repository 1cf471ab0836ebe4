//! Valuation engine: ledger snapshot × live prices → report
//!
//! Pure computation, no I/O. Positions whose price could not be fetched
//! are omitted from the rows and the totals and listed in `skipped`;
//! a missing price is never treated as zero and never aborts the report.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::LedgerSnapshot;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Per-position valuation row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRow {
    pub symbol: String,
    pub shares: u64,
    pub avg_price: Decimal,
    pub current_price: Decimal,
    pub market_value: Decimal,
    pub cost_value: Decimal,
    pub profit_loss: Decimal,
    /// Unrealized P&L as a percentage of cost (0 when cost is 0)
    pub profit_percent: Decimal,
    /// Price move vs average cost (0 when avg is 0)
    pub change_percent: Decimal,
    /// Share of total market value held in this position
    pub allocation_percent: Decimal,
}

/// Aggregate valuation of a ledger snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    /// Rows in ascending symbol order
    pub rows: Vec<PositionRow>,
    /// Symbols held but excluded because no price was available
    pub skipped: Vec<String>,
    pub cash: Decimal,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub total_profit_percent: Decimal,
}

impl ValuationReport {
    /// Compute the report from a snapshot and the prices that could be
    /// fetched. `prices` maps symbol to current price; absent symbols
    /// are skipped.
    pub fn compute(snapshot: &LedgerSnapshot, prices: &HashMap<String, Decimal>) -> Self {
        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        let mut total_value = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;

        for (symbol, position) in &snapshot.positions {
            let Some(&current_price) = prices.get(symbol) else {
                skipped.push(symbol.clone());
                continue;
            };

            let shares = Decimal::from(position.shares);
            let market_value = shares * current_price;
            let cost_value = shares * position.avg_price;
            let profit_loss = market_value - cost_value;
            let profit_percent = if cost_value.is_zero() {
                Decimal::ZERO
            } else {
                HUNDRED * profit_loss / cost_value
            };
            let change_percent = if position.avg_price.is_zero() {
                Decimal::ZERO
            } else {
                HUNDRED * (current_price - position.avg_price) / position.avg_price
            };

            total_value += market_value;
            total_cost += cost_value;

            rows.push(PositionRow {
                symbol: symbol.clone(),
                shares: position.shares,
                avg_price: position.avg_price,
                current_price,
                market_value,
                cost_value,
                profit_loss,
                profit_percent,
                change_percent,
                allocation_percent: Decimal::ZERO,
            });
        }

        // Allocation needs the final total, so fill it in afterwards
        if !total_value.is_zero() {
            for row in &mut rows {
                row.allocation_percent = HUNDRED * row.market_value / total_value;
            }
        }

        let total_profit = total_value - total_cost;
        let total_profit_percent = if total_cost.is_zero() {
            Decimal::ZERO
        } else {
            HUNDRED * total_profit / total_cost
        };

        Self {
            rows,
            skipped,
            cash: snapshot.cash,
            total_value,
            total_cost,
            total_profit,
            total_profit_percent,
        }
    }

    /// Cash plus market value of priced positions
    pub fn equity(&self) -> Decimal {
        self.cash + self.total_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerState;
    use rust_decimal_macros::dec;

    fn snapshot_with(trades: &[(&str, u64, Decimal)]) -> LedgerSnapshot {
        let mut state = LedgerState::new(dec!(100000));
        for (symbol, quantity, price) in trades {
            state.apply_buy(symbol, *quantity, *price).unwrap();
        }
        state.snapshot()
    }

    #[test]
    fn test_empty_ledger_yields_zero_report() {
        let snapshot = LedgerState::new(dec!(100000)).snapshot();
        let report = ValuationReport::compute(&snapshot, &HashMap::new());

        assert!(report.rows.is_empty());
        assert!(report.skipped.is_empty());
        assert_eq!(report.total_value, Decimal::ZERO);
        assert_eq!(report.total_cost, Decimal::ZERO);
        assert_eq!(report.total_profit, Decimal::ZERO);
        assert_eq!(report.total_profit_percent, Decimal::ZERO);
        assert_eq!(report.equity(), dec!(100000));
    }

    #[test]
    fn test_single_position_math() {
        let snapshot = snapshot_with(&[("AAA", 10, dec!(50))]);
        let prices = HashMap::from([("AAA".to_string(), dec!(60))]);
        let report = ValuationReport::compute(&snapshot, &prices);

        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.market_value, dec!(600));
        assert_eq!(row.cost_value, dec!(500));
        assert_eq!(row.profit_loss, dec!(100));
        assert_eq!(row.profit_percent, dec!(20));
        assert_eq!(row.change_percent, dec!(20));
        assert_eq!(row.allocation_percent, dec!(100));
        assert_eq!(report.total_profit, dec!(100));
    }

    #[test]
    fn test_unpriced_positions_are_skipped_not_zeroed() {
        let snapshot = snapshot_with(&[("AAA", 10, dec!(50)), ("BBB", 4, dec!(25))]);
        let prices = HashMap::from([("AAA".to_string(), dec!(55))]);
        let report = ValuationReport::compute(&snapshot, &prices);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].symbol, "AAA");
        assert_eq!(report.skipped, vec!["BBB".to_string()]);
        // BBB's cost must not leak into the totals
        assert_eq!(report.total_cost, dec!(500));
        assert_eq!(report.total_value, dec!(550));
    }

    #[test]
    fn test_rows_are_in_ascending_symbol_order() {
        let snapshot = snapshot_with(&[
            ("ZZZ", 1, dec!(10)),
            ("AAA", 1, dec!(10)),
            ("MMM", 1, dec!(10)),
        ]);
        let prices = HashMap::from([
            ("ZZZ".to_string(), dec!(10)),
            ("AAA".to_string(), dec!(10)),
            ("MMM".to_string(), dec!(10)),
        ]);
        let report = ValuationReport::compute(&snapshot, &prices);

        let symbols: Vec<_> = report.rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA", "MMM", "ZZZ"]);
    }

    #[test]
    fn test_allocation_sums_to_hundred() {
        let snapshot = snapshot_with(&[("AAA", 10, dec!(50)), ("BBB", 10, dec!(50))]);
        let prices = HashMap::from([
            ("AAA".to_string(), dec!(75)),
            ("BBB".to_string(), dec!(25)),
        ]);
        let report = ValuationReport::compute(&snapshot, &prices);

        assert_eq!(report.rows[0].allocation_percent, dec!(75));
        assert_eq!(report.rows[1].allocation_percent, dec!(25));
        let sum: Decimal = report.rows.iter().map(|r| r.allocation_percent).sum();
        assert_eq!(sum, dec!(100));
    }

    #[test]
    fn test_losing_position_reports_negative_pnl() {
        let snapshot = snapshot_with(&[("AAA", 10, dec!(50))]);
        let prices = HashMap::from([("AAA".to_string(), dec!(40))]);
        let report = ValuationReport::compute(&snapshot, &prices);

        let row = &report.rows[0];
        assert_eq!(row.profit_loss, dec!(-100));
        assert_eq!(row.profit_percent, dec!(-20));
        assert_eq!(report.total_profit_percent, dec!(-20));
    }
}
