//! CLI module for paperfolio
//!
//! Argument parsing with clap and a structured command pattern: each
//! subcommand owns its args and an `execute` taking the shared app
//! context (config, data paths, trading desk).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub mod commands;

use crate::config::{AppConfig, FeedKind};
use crate::data_paths::DataPaths;
use crate::desk::TradingDesk;
use crate::feed::build_feed;
use crate::logging::{self, LogMode, LoggingConfig};
use crate::service::WalletService;
use crate::store::JsonWalletStore;
use crate::universe::Universe;

use commands::buy::{BuyArgs, BuyCommand};
use commands::chart::{ChartArgs, ChartCommand};
use commands::history::{HistoryArgs, HistoryCommand};
use commands::sell::{SellArgs, SellCommand};
use commands::serve::{ServeArgs, ServeCommand};
use commands::stocks::{StocksArgs, StocksCommand};
use commands::wallet::{WalletArgs, WalletCommand};

/// Everything a command needs to run
pub struct AppContext {
    pub config: AppConfig,
    pub data_paths: DataPaths,
    pub desk: Arc<TradingDesk>,
}

#[derive(Parser)]
#[command(name = "paperfolio")]
#[command(version)]
#[command(about = "Paper-trading portfolio simulator for Tadawul stocks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory path (default: the OS user data directory)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Use fixed reference prices instead of the live feed
    #[arg(long, global = true)]
    pub offline: bool,

    /// Log to file only, keep the console clean
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the tradable universe with current prices
    Stocks(StocksArgs),

    /// Show recent price history for one symbol
    Chart(ChartArgs),

    /// Buy shares at the current price
    Buy(BuyArgs),

    /// Sell shares at the current price
    Sell(SellArgs),

    /// Show cash, positions and unrealized P&L
    Wallet(WalletArgs),

    /// Show the trade log
    History(HistoryArgs),

    /// Run the HTTP trade API
    Serve(ServeArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let data_paths = match &self.data_dir {
            Some(path) => DataPaths::new(path),
            None => DataPaths::user_default(),
        };
        data_paths.ensure_directories()?;

        let mode = if self.quiet {
            LogMode::FileOnly
        } else {
            LogMode::ConsoleAndFile
        };
        logging::init_logging(LoggingConfig::new(mode, data_paths.clone()))?;

        let mut config = AppConfig::load(&data_paths)?;
        if self.offline {
            config.feed.kind = FeedKind::Offline;
        }

        let ctx = build_context(config, data_paths).await?;

        match self.command {
            Commands::Stocks(args) => StocksCommand::new(args).execute(&ctx).await,
            Commands::Chart(args) => ChartCommand::new(args).execute(&ctx).await,
            Commands::Buy(args) => BuyCommand::new(args).execute(&ctx).await,
            Commands::Sell(args) => SellCommand::new(args).execute(&ctx).await,
            Commands::Wallet(args) => WalletCommand::new(args).execute(&ctx).await,
            Commands::History(args) => HistoryCommand::new(args).execute(&ctx).await,
            Commands::Serve(args) => ServeCommand::new(args).execute(&ctx).await,
        }
    }
}

/// Wire universe, feed, store and wallet service into a trading desk
pub async fn build_context(config: AppConfig, data_paths: DataPaths) -> Result<AppContext> {
    let universe = match &config.universe_file {
        Some(path) => Universe::from_file(path)?,
        None => Universe::builtin(),
    };
    let universe = Arc::new(universe);

    let feed = build_feed(&config, &universe)?;
    let store = Arc::new(JsonWalletStore::new(data_paths.ledger_file()));
    let wallet = WalletService::spawn(store, config.starting_cash).await?;
    let desk = Arc::new(TradingDesk::new(
        universe,
        feed,
        wallet,
        Duration::from_secs(config.quote_ttl_secs),
    ));

    Ok(AppContext {
        config,
        data_paths,
        desk,
    })
}
