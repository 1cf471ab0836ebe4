//! Table rendering for the CLI
//!
//! Output mirrors the wallet views: listing, valuation report, trade
//! log. Profit and loss cells are colored green/red.

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use std::path::Path;

use crate::desk::StockListing;
use crate::feed::Candle;
use crate::ledger::{LedgerSnapshot, TradeRecord};
use crate::valuation::ValuationReport;

fn signed_cell(value: Decimal, text: String) -> Cell {
    if value > Decimal::ZERO {
        Cell::new(text.green().to_string())
    } else if value < Decimal::ZERO {
        Cell::new(text.red().to_string())
    } else {
        Cell::new(text)
    }
}

/// Print the tradable universe with current prices
pub fn print_listings(listings: &[StockListing]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Symbol", "Name", "Price"]);

    for listing in listings {
        let price = listing
            .price
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        table.add_row(vec![
            Cell::new(&listing.symbol),
            Cell::new(&listing.name),
            Cell::new(price),
        ]);
    }

    println!("{table}");
}

/// Print cash, valuation rows and aggregate totals
pub fn print_wallet(snapshot: &LedgerSnapshot, report: &ValuationReport) {
    println!("{}", "WALLET".bright_yellow());
    println!("Cash balance: {}", format!("{:.2}", snapshot.cash).bright_green());

    if snapshot.positions.is_empty() {
        println!("{}", "No open positions".bright_black());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Symbol", "Shares", "Avg Price", "Price", "Market Value", "P&L", "P&L %",
            "Change %", "Alloc %",
        ]);

    for row in &report.rows {
        table.add_row(vec![
            Cell::new(&row.symbol),
            Cell::new(row.shares),
            Cell::new(format!("{:.2}", row.avg_price)),
            Cell::new(format!("{:.2}", row.current_price)),
            Cell::new(format!("{:.2}", row.market_value)),
            signed_cell(row.profit_loss, format!("{:.2}", row.profit_loss)),
            signed_cell(row.profit_percent, format!("{:.2}%", row.profit_percent)),
            signed_cell(row.change_percent, format!("{:.2}%", row.change_percent)),
            Cell::new(format!("{:.1}%", row.allocation_percent)),
        ]);
    }
    println!("{table}");

    println!(
        "Positions: {}   Cost: {}   Value: {}   P&L: {}",
        report.rows.len(),
        format!("{:.2}", report.total_cost),
        format!("{:.2}", report.total_value),
        if report.total_profit >= Decimal::ZERO {
            format!("{:.2} ({:.2}%)", report.total_profit, report.total_profit_percent)
                .green()
                .to_string()
        } else {
            format!("{:.2} ({:.2}%)", report.total_profit, report.total_profit_percent)
                .red()
                .to_string()
        }
    );
    println!("Total equity: {}", format!("{:.2}", report.equity()).bright_green());

    if !report.skipped.is_empty() {
        println!(
            "{} {}",
            "No price available for:".bright_black(),
            report.skipped.join(", ").bright_black()
        );
    }
}

/// Print the trade log, oldest first
pub fn print_history(records: &[TradeRecord]) {
    if records.is_empty() {
        println!("{}", "No trades yet".bright_black());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Executed", "Action", "Symbol", "Quantity", "Price", "Total"]);

    for record in records {
        let action = match record.action {
            crate::ledger::TradeAction::Buy => "buy".green().to_string(),
            crate::ledger::TradeAction::Sell => "sell".red().to_string(),
        };
        table.add_row(vec![
            Cell::new(record.executed_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(action),
            Cell::new(&record.symbol),
            Cell::new(record.quantity),
            Cell::new(format!("{:.2}", record.price)),
            Cell::new(format!("{:.2}", record.total())),
        ]);
    }
    println!("{table}");
}

/// Print a daily close series
pub fn print_candles(symbol: &str, candles: &[Candle]) {
    if candles.is_empty() {
        println!("{}", format!("No history available for {symbol}").bright_black());
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Date", "Close"]);
    for candle in candles {
        table.add_row(vec![
            Cell::new(candle.timestamp.format("%Y-%m-%d")),
            Cell::new(format!("{:.2}", candle.close)),
        ]);
    }
    println!("{table}");
}

/// Export the trade log as CSV
pub fn export_history_csv(records: &[TradeRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    writer.write_record(["id", "executed_at", "action", "symbol", "quantity", "price", "total"])?;
    for record in records {
        writer.write_record([
            record.id.to_string(),
            record.executed_at.to_rfc3339(),
            record.action.to_string(),
            record.symbol.clone(),
            record.quantity.to_string(),
            record.price.to_string(),
            record.total().to_string(),
        ])?;
    }
    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerState;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_export_writes_one_line_per_trade() {
        let mut state = LedgerState::new(dec!(100000));
        state.apply_buy("2222.SR", 10, dec!(27.15)).unwrap();
        state.apply_sell("2222.SR", 4, dec!(28)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        export_history_csv(&state.history, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 trades
        assert!(lines[1].contains("buy"));
        assert!(lines[2].contains("sell"));
        assert!(lines[1].contains("2222.SR"));
    }
}
