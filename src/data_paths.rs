use std::path::{Path, PathBuf};

/// Default data directory (relative to current working directory)
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Subdirectory paths relative to the data directory
pub const WALLET_DIR: &str = "wallet";
pub const LOGS_DIR: &str = "logs";
pub const EXPORTS_DIR: &str = "exports";

/// Helper struct to manage data paths
#[derive(Clone, Debug)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Create a new DataPaths instance with the given root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Fall back to the OS-level project data directory when no root was given
    pub fn user_default() -> Self {
        match directories::ProjectDirs::from("com", "paperfolio", "paperfolio") {
            Some(dirs) => Self::new(dirs.data_dir()),
            None => Self::new(DEFAULT_DATA_DIR),
        }
    }

    /// Get the root data directory
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Get the wallet directory (persisted ledger state)
    pub fn wallet(&self) -> PathBuf {
        self.root.join(WALLET_DIR)
    }

    /// Path of the single persisted ledger document
    pub fn ledger_file(&self) -> PathBuf {
        self.wallet().join("ledger.json")
    }

    /// Get the logs directory
    pub fn logs(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// Get the exports directory (CSV trade logs)
    pub fn exports(&self) -> PathBuf {
        self.root.join(EXPORTS_DIR)
    }

    /// Path of the optional YAML config file
    pub fn config_file(&self) -> PathBuf {
        self.root.join("paperfolio.yaml")
    }

    /// Ensure all directories exist
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.wallet())?;
        std::fs::create_dir_all(self.logs())?;
        std::fs::create_dir_all(self.exports())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_under_root() {
        let paths = DataPaths::new("/tmp/pf-test");
        assert!(paths.wallet().starts_with(paths.root()));
        assert!(paths.ledger_file().starts_with(paths.wallet()));
        assert!(paths.logs().starts_with(paths.root()));
        assert_eq!(paths.config_file().file_name().unwrap(), "paperfolio.yaml");
    }
}
