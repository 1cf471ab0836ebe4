//! Wallet persistence
//!
//! The whole ledger state (cash, positions, history) is saved as one
//! JSON document so a crash can never leave cash and positions
//! referring to different points in time. Writes go to a temp file and
//! are renamed into place; the document carries a blake3 checksum that
//! is verified on load.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

use crate::ledger::LedgerState;

const WALLET_FORMAT_VERSION: u32 = 1;

/// Durable load/save of the ledger state as one atomic unit
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Return the persisted state, or a freshly initialized one with the
    /// given starting cash on first run
    async fn load_or_init(&self, starting_cash: Decimal) -> Result<LedgerState>;

    /// Persist the whole state; a trade is only committed once this
    /// has returned Ok
    async fn save(&self, state: &LedgerState) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredWallet {
    version: u32,
    saved_at: DateTime<Utc>,
    /// blake3 hex digest of the serialized `state` field
    checksum: String,
    state: LedgerState,
}

/// JSON-file-backed wallet store
#[derive(Clone)]
pub struct JsonWalletStore {
    path: PathBuf,
}

impl JsonWalletStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn state_checksum(state: &LedgerState) -> Result<String> {
        let bytes = serde_json::to_vec(state).context("Failed to serialize ledger state")?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

#[async_trait]
impl WalletStore for JsonWalletStore {
    async fn load_or_init(&self, starting_cash: Decimal) -> Result<LedgerState> {
        if !self.path.exists() {
            info!(path = %self.path.display(), %starting_cash, "no wallet on disk, initializing");
            let state = LedgerState::new(starting_cash);
            self.save(&state).await?;
            return Ok(state);
        }

        let contents = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read wallet file: {}", self.path.display()))?;
        let stored: StoredWallet = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse wallet file: {}", self.path.display()))?;

        if stored.version != WALLET_FORMAT_VERSION {
            anyhow::bail!(
                "unsupported wallet format version {} in {}",
                stored.version,
                self.path.display()
            );
        }

        let expected = Self::state_checksum(&stored.state)?;
        if stored.checksum != expected {
            anyhow::bail!(
                "wallet checksum mismatch in {} (file corrupted?)",
                self.path.display()
            );
        }

        debug!(
            path = %self.path.display(),
            positions = stored.state.positions.len(),
            trades = stored.state.history.len(),
            "wallet loaded"
        );
        Ok(stored.state)
    }

    async fn save(&self, state: &LedgerState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create wallet dir: {}", parent.display()))?;
        }

        let stored = StoredWallet {
            version: WALLET_FORMAT_VERSION,
            saved_at: Utc::now(),
            checksum: Self::state_checksum(state)?,
            state: state.clone(),
        };
        let json =
            serde_json::to_string_pretty(&stored).context("Failed to serialize wallet")?;

        // Write-then-rename keeps the previous document intact if we
        // crash mid-write
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("Failed to write wallet file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to move wallet file into place: {}", self.path.display()))?;

        debug!(path = %self.path.display(), "wallet saved");
        Ok(())
    }
}
