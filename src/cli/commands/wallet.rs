use anyhow::Result;
use clap::Args;

use crate::cli::AppContext;
use crate::display;

#[derive(Args, Clone)]
pub struct WalletArgs {}

pub struct WalletCommand {
    #[allow(dead_code)]
    args: WalletArgs,
}

impl WalletCommand {
    pub fn new(args: WalletArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let (snapshot, report) = ctx.desk.wallet_report().await?;
        display::print_wallet(&snapshot, &report);
        Ok(())
    }
}
