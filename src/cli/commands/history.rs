use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::cli::AppContext;
use crate::display;

#[derive(Args, Clone)]
pub struct HistoryArgs {
    /// Also write the log as CSV to this path (relative paths land in
    /// the exports directory)
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub struct HistoryCommand {
    args: HistoryArgs,
}

impl HistoryCommand {
    pub fn new(args: HistoryArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let records = ctx.desk.trade_log().await?;
        display::print_history(&records);

        if let Some(export) = &self.args.export {
            let path = if export.is_absolute() {
                export.clone()
            } else {
                ctx.data_paths.exports().join(export)
            };
            display::export_history_csv(&records, &path)?;
            println!("Exported {} trades to {}", records.len(), path.display().to_string().bright_cyan());
        }
        Ok(())
    }
}
