use anyhow::Result;
use clap::Args;

use crate::cli::AppContext;
use crate::display;
use crate::feed::HistoryRange;

#[derive(Args, Clone)]
pub struct ChartArgs {
    /// Exchange ticker, e.g. 2222.SR
    pub symbol: String,

    /// History window: 1mo, 3mo, 6mo or 1y
    #[arg(long, default_value = "3mo")]
    pub range: String,
}

pub struct ChartCommand {
    args: ChartArgs,
}

impl ChartCommand {
    pub fn new(args: ChartArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let range: HistoryRange = self.args.range.parse()?;
        let candles = ctx.desk.history(&self.args.symbol, range).await?;
        display::print_candles(&self.args.symbol, &candles);
        Ok(())
    }
}
