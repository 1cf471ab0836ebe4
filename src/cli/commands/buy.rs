use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::info;

use crate::cli::AppContext;

#[derive(Args, Clone)]
pub struct BuyArgs {
    /// Exchange ticker, e.g. 2222.SR
    pub symbol: String,

    /// Number of shares
    pub quantity: u64,
}

pub struct BuyCommand {
    args: BuyArgs,
}

impl BuyCommand {
    pub fn new(args: BuyArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        info!("buying {} x {}", self.args.quantity, self.args.symbol);

        let record = ctx.desk.buy(&self.args.symbol, self.args.quantity).await?;

        println!(
            "{} {} x {} @ {} (total {})",
            "Bought".green(),
            record.quantity,
            record.symbol,
            format!("{:.2}", record.price),
            format!("{:.2}", record.total()),
        );

        let snapshot = ctx.desk.wallet_report().await?.0;
        println!("Cash balance: {}", format!("{:.2}", snapshot.cash).bright_green());
        Ok(())
    }
}
