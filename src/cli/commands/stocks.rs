use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cli::AppContext;
use crate::display;

#[derive(Args, Clone)]
pub struct StocksArgs {}

pub struct StocksCommand {
    #[allow(dead_code)]
    args: StocksArgs,
}

impl StocksCommand {
    pub fn new(args: StocksArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        spinner.set_message(format!(
            "Fetching quotes for {} symbols...",
            ctx.desk.universe().len()
        ));
        spinner.enable_steady_tick(Duration::from_millis(120));

        let listings = ctx.desk.listings().await;

        spinner.finish_and_clear();
        display::print_listings(&listings);

        let unpriced = listings.iter().filter(|l| l.price.is_none()).count();
        if unpriced > 0 {
            tracing::warn!("{unpriced} symbols have no price right now");
        }
        Ok(())
    }
}
