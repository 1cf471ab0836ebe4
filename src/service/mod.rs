//! Wallet service actor with channel-based communication
//!
//! The actor is the single owner of the ledger state: commands arrive
//! over an mpsc channel and are processed strictly one at a time, so
//! the average-price recomputation can never interleave. Price lookups
//! happen before a command is sent (see the trading desk) — nothing
//! slow runs inside the actor.
//!
//! Commit protocol: a trade is applied to a candidate copy of the
//! state, the copy is saved, and only then does it replace the live
//! state. A failed save rolls back to the previous state and surfaces
//! `TradeError::Persistence`.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::errors::TradeError;
use crate::ledger::{LedgerSnapshot, LedgerState, TradeRecord};
use crate::store::WalletStore;

const COMMAND_BUFFER: usize = 64;

/// Wallet service commands
#[derive(Debug)]
pub enum WalletCommand {
    Buy {
        symbol: String,
        quantity: u64,
        price: Decimal,
        respond: oneshot::Sender<Result<TradeRecord, TradeError>>,
    },
    Sell {
        symbol: String,
        quantity: u64,
        price: Decimal,
        respond: oneshot::Sender<Result<TradeRecord, TradeError>>,
    },
    Snapshot {
        respond: oneshot::Sender<LedgerSnapshot>,
    },
    History {
        respond: oneshot::Sender<Vec<TradeRecord>>,
    },
}

/// Cloneable handle for talking to the wallet actor
#[derive(Clone)]
pub struct WalletHandle {
    tx: mpsc::Sender<WalletCommand>,
}

impl WalletHandle {
    pub async fn buy(
        &self,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<TradeRecord, TradeError> {
        let (respond, rx) = oneshot::channel();
        self.tx
            .send(WalletCommand::Buy {
                symbol: symbol.to_string(),
                quantity,
                price,
                respond,
            })
            .await
            .map_err(|_| TradeError::Persistence(anyhow::anyhow!("wallet service stopped")))?;
        rx.await
            .map_err(|_| TradeError::Persistence(anyhow::anyhow!("wallet service dropped reply")))?
    }

    pub async fn sell(
        &self,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<TradeRecord, TradeError> {
        let (respond, rx) = oneshot::channel();
        self.tx
            .send(WalletCommand::Sell {
                symbol: symbol.to_string(),
                quantity,
                price,
                respond,
            })
            .await
            .map_err(|_| TradeError::Persistence(anyhow::anyhow!("wallet service stopped")))?;
        rx.await
            .map_err(|_| TradeError::Persistence(anyhow::anyhow!("wallet service dropped reply")))?
    }

    pub async fn snapshot(&self) -> anyhow::Result<LedgerSnapshot> {
        let (respond, rx) = oneshot::channel();
        self.tx
            .send(WalletCommand::Snapshot { respond })
            .await
            .map_err(|_| anyhow::anyhow!("wallet service stopped"))?;
        Ok(rx.await?)
    }

    pub async fn history(&self) -> anyhow::Result<Vec<TradeRecord>> {
        let (respond, rx) = oneshot::channel();
        self.tx
            .send(WalletCommand::History { respond })
            .await
            .map_err(|_| anyhow::anyhow!("wallet service stopped"))?;
        Ok(rx.await?)
    }
}

/// The actor owning the ledger state
pub struct WalletService {
    state: LedgerState,
    store: Arc<dyn WalletStore>,
    rx: mpsc::Receiver<WalletCommand>,
}

impl WalletService {
    /// Load the persisted state and spawn the actor task
    pub async fn spawn(
        store: Arc<dyn WalletStore>,
        starting_cash: Decimal,
    ) -> anyhow::Result<WalletHandle> {
        let state = store.load_or_init(starting_cash).await?;
        info!(
            cash = %state.cash,
            positions = state.positions.len(),
            trades = state.history.len(),
            "wallet service starting"
        );

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let service = WalletService { state, store, rx };
        tokio::spawn(service.run());
        Ok(WalletHandle { tx })
    }

    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                WalletCommand::Buy {
                    symbol,
                    quantity,
                    price,
                    respond,
                } => {
                    let result = self
                        .apply_trade(|state| state.apply_buy(&symbol, quantity, price))
                        .await;
                    let _ = respond.send(result);
                }
                WalletCommand::Sell {
                    symbol,
                    quantity,
                    price,
                    respond,
                } => {
                    let result = self
                        .apply_trade(|state| state.apply_sell(&symbol, quantity, price))
                        .await;
                    let _ = respond.send(result);
                }
                WalletCommand::Snapshot { respond } => {
                    let _ = respond.send(self.state.snapshot());
                }
                WalletCommand::History { respond } => {
                    let _ = respond.send(self.state.history.clone());
                }
            }
        }
        info!("wallet service stopped");
    }

    /// Apply a mutation to a candidate state, persist it, then commit
    async fn apply_trade<F>(&mut self, mutate: F) -> Result<TradeRecord, TradeError>
    where
        F: FnOnce(&mut LedgerState) -> Result<TradeRecord, TradeError>,
    {
        let mut candidate = self.state.clone();
        let record = mutate(&mut candidate)?;

        if let Err(e) = self.store.save(&candidate).await {
            error!("failed to persist trade, rolling back: {e:#}");
            return Err(TradeError::Persistence(e));
        }

        self.state = candidate;
        info!(
            trade_id = %record.id,
            symbol = %record.symbol,
            action = %record.action,
            quantity = record.quantity,
            price = %record.price,
            cash = %self.state.cash,
            "trade committed"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonWalletStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    fn temp_store(dir: &tempfile::TempDir) -> Arc<dyn WalletStore> {
        Arc::new(JsonWalletStore::new(dir.path().join("ledger.json")))
    }

    #[tokio::test]
    async fn test_trades_mutate_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = WalletService::spawn(temp_store(&dir), dec!(100000))
            .await
            .unwrap();

        wallet.buy("2222.SR", 10, dec!(27.15)).await.unwrap();
        let snapshot = wallet.snapshot().await.unwrap();
        assert_eq!(snapshot.positions["2222.SR"].shares, 10);
        assert_eq!(snapshot.cash, dec!(100000) - dec!(271.50));

        // a second service over the same file sees the committed trade
        let wallet2 = WalletService::spawn(temp_store(&dir), dec!(100000))
            .await
            .unwrap();
        let snapshot2 = wallet2.snapshot().await.unwrap();
        assert_eq!(snapshot2.positions["2222.SR"].shares, 10);
    }

    #[tokio::test]
    async fn test_rejected_trade_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = WalletService::spawn(temp_store(&dir), dec!(100))
            .await
            .unwrap();

        let err = wallet.buy("2222.SR", 1000, dec!(27.15)).await.unwrap_err();
        assert!(matches!(err, TradeError::InsufficientFunds { .. }));

        let snapshot = wallet.snapshot().await.unwrap();
        assert_eq!(snapshot.cash, dec!(100));
        assert!(snapshot.positions.is_empty());
        assert_eq!(snapshot.trade_count, 0);
    }

    struct FailingStore;

    #[async_trait]
    impl WalletStore for FailingStore {
        async fn load_or_init(&self, starting_cash: Decimal) -> anyhow::Result<LedgerState> {
            Ok(LedgerState::new(starting_cash))
        }

        async fn save(&self, _state: &LedgerState) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_the_trade() {
        let wallet = WalletService::spawn(Arc::new(FailingStore), dec!(100000))
            .await
            .unwrap();

        let err = wallet.buy("2222.SR", 10, dec!(27.15)).await.unwrap_err();
        assert!(matches!(err, TradeError::Persistence(_)));

        let snapshot = wallet.snapshot().await.unwrap();
        assert_eq!(snapshot.cash, dec!(100000));
        assert!(snapshot.positions.is_empty());
        assert_eq!(snapshot.trade_count, 0);
    }

    #[tokio::test]
    async fn test_commands_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = WalletService::spawn(temp_store(&dir), dec!(100000))
            .await
            .unwrap();

        // fire a burst of concurrent buys; every one must be applied
        // atomically against the latest state
        let mut tasks = Vec::new();
        for _ in 0..20 {
            let wallet = wallet.clone();
            tasks.push(tokio::spawn(async move {
                wallet.buy("2222.SR", 1, dec!(10)).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let snapshot = wallet.snapshot().await.unwrap();
        assert_eq!(snapshot.positions["2222.SR"].shares, 20);
        assert_eq!(snapshot.cash, dec!(100000) - dec!(200));
        assert_eq!(snapshot.trade_count, 20);
    }
}
