//! Configuration for bookledger
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a library instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── catalog.json       (catalog snapshot)
    ///     ├── library_data.json  (older snapshot, read only as a fallback)
    ///     ├── borrow_log.bin     (loan/return ledger)
    ///     ├── loan.bin           (legacy loan-only ledger)
    ///     └── operation.log      (text audit log)
    pub data_dir: PathBuf,

    /// Snapshot file name inside `data_dir`
    pub snapshot_file: String,

    /// Snapshot consulted when `snapshot_file` is missing or corrupt
    pub legacy_snapshot_file: String,

    // -------------------------------------------------------------------------
    // Ledger Configuration
    // -------------------------------------------------------------------------
    /// Current-format ledger file name
    pub ledger_file: String,

    /// Legacy ledger file name (isbn/quantity/timestamp records)
    pub legacy_ledger_file: String,

    /// Sync strategy: whether each ledger append is fsynced
    pub ledger_sync_strategy: LedgerSyncStrategy,

    /// Replay the ledger into the catalog right after the snapshot loads
    pub replay_on_open: bool,

    // -------------------------------------------------------------------------
    // Audit Configuration
    // -------------------------------------------------------------------------
    /// Text operation log file name
    pub audit_file: String,
}

/// Ledger sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerSyncStrategy {
    /// fsync after every appended record (safest, slowest)
    EveryAppend,

    /// flush to the OS on close and let it decide when to hit disk
    OsBuffered,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./library_data"),
            snapshot_file: "catalog.json".to_string(),
            legacy_snapshot_file: "library_data.json".to_string(),
            ledger_file: "borrow_log.bin".to_string(),
            legacy_ledger_file: "loan.bin".to_string(),
            ledger_sync_strategy: LedgerSyncStrategy::OsBuffered,
            replay_on_open: false,
            audit_file: "operation.log".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }

    pub fn legacy_snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.legacy_snapshot_file)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    pub fn legacy_ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.legacy_ledger_file)
    }

    pub fn audit_path(&self) -> PathBuf {
        self.data_dir.join(&self.audit_file)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the snapshot file name
    pub fn snapshot_file(mut self, name: impl Into<String>) -> Self {
        self.config.snapshot_file = name.into();
        self
    }

    /// Set the fallback snapshot file name
    pub fn legacy_snapshot_file(mut self, name: impl Into<String>) -> Self {
        self.config.legacy_snapshot_file = name.into();
        self
    }

    /// Set the ledger file name
    pub fn ledger_file(mut self, name: impl Into<String>) -> Self {
        self.config.ledger_file = name.into();
        self
    }

    /// Set the legacy ledger file name
    pub fn legacy_ledger_file(mut self, name: impl Into<String>) -> Self {
        self.config.legacy_ledger_file = name.into();
        self
    }

    /// Set the ledger sync strategy
    pub fn ledger_sync_strategy(mut self, strategy: LedgerSyncStrategy) -> Self {
        self.config.ledger_sync_strategy = strategy;
        self
    }

    /// Replay the ledger on open
    pub fn replay_on_open(mut self, enabled: bool) -> Self {
        self.config.replay_on_open = enabled;
        self
    }

    /// Set the audit log file name
    pub fn audit_file(mut self, name: impl Into<String>) -> Self {
        self.config.audit_file = name.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
