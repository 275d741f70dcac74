//! Ledger Module
//!
//! Append-only binary log of every loan and return.
//!
//! ## Responsibilities
//! - Append one fixed-size record per loan/return (best effort)
//! - Replay records into catalog counters after a restart
//! - Read the legacy loan-only ledger when the current one is absent
//! - Rebuild which individual loans are still outstanding
//!
//! ## File Formats
//! ```text
//! Current (136 bytes per record, little-endian):
//! ┌────────────┬───────────┬─────────────┬──────────────┬───────────────┐
//! │ Action (4) │ ISBN (20) │ Title (100) │ Quantity (4) │ Timestamp (8) │
//! └────────────┴───────────┴─────────────┴──────────────┴───────────────┘
//!
//! Legacy (32 bytes per record, always a loan):
//! ┌───────────┬──────────────┬───────────────┐
//! │ ISBN (20) │ Quantity (4) │ Timestamp (8) │
//! └───────────┴──────────────┴───────────────┘
//! ```
//! Text fields are NUL-padded. Action 1 = loan, 2 = return.
//!
//! ## Source Selection
//! Replay reads the current file if it exists and the legacy file only if it
//! does not. The two are never merged.

mod history;
mod reader;
mod record;
mod replay;
mod writer;

pub use history::{build_outstanding_history, HistoryEntry, LoanStatus};
pub use reader::{LedgerIterator, LedgerReader, LedgerScan};
pub use record::{
    Action, LedgerEvent, LedgerFormat, ISBN_WIDTH, LEGACY_RECORD_SIZE, RECORD_SIZE, TITLE_WIDTH,
};
pub use replay::{apply_event, Applied, ReplayResult};
pub use writer::LedgerWriter;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::{Config, LedgerSyncStrategy};
use crate::error::Result;

/// The loan ledger: current file, legacy fallback, and the append policy
///
/// ## Append Policy
/// [`Ledger::append`] never fails. A loan or return has already happened in
/// memory by the time it is logged, so a write error is reported through a
/// `warn!` event and the [`failed_appends`](Ledger::failed_appends) counter
/// instead of being returned.
#[derive(Debug)]
pub struct Ledger {
    legacy_path: PathBuf,
    writer: LedgerWriter,
    failed_appends: AtomicU64,
}

impl Ledger {
    pub fn new(
        path: impl Into<PathBuf>,
        legacy_path: impl Into<PathBuf>,
        sync_strategy: LedgerSyncStrategy,
    ) -> Self {
        Self {
            legacy_path: legacy_path.into(),
            writer: LedgerWriter::new(path, sync_strategy),
            failed_appends: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ledger_path(),
            config.legacy_ledger_path(),
            config.ledger_sync_strategy,
        )
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Record a loan or return, swallowing any write failure
    pub fn append(&self, action: Action, isbn: &str, title: &str, quantity: u32) {
        self.append_event(&LedgerEvent::new(action, isbn, title, quantity));
    }

    /// Record a prepared event, swallowing any write failure
    pub fn append_event(&self, event: &LedgerEvent) {
        match self.writer.append(event) {
            Ok(()) => debug!(
                action = %event.action,
                isbn = %event.isbn,
                quantity = event.quantity,
                "ledger append"
            ),
            Err(e) => {
                let failures = self.failed_appends.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    path = %self.writer.path().display(),
                    action = %event.action,
                    isbn = %event.isbn,
                    error = %e,
                    failures,
                    "ledger append failed; event not recorded"
                );
            }
        }
    }

    /// Appends that failed since this ledger was created
    pub fn failed_appends(&self) -> u64 {
        self.failed_appends.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// The file a read would use right now, if any
    pub fn source(&self) -> Option<(&Path, LedgerFormat)> {
        if self.path().exists() {
            Some((self.path(), LedgerFormat::Current))
        } else if self.legacy_path.exists() {
            Some((self.legacy_path.as_path(), LedgerFormat::Legacy))
        } else {
            None
        }
    }

    /// Fold the ledger into the catalog's counters
    pub fn replay(&self, catalog: &mut Catalog) -> Result<ReplayResult> {
        match self.source() {
            Some((path, format)) => {
                if format == LedgerFormat::Legacy {
                    info!(path = %path.display(), "current ledger absent; replaying legacy ledger");
                }
                replay::replay_file(catalog, path, format)
            }
            None => {
                debug!("no ledger to replay");
                Ok(ReplayResult::default())
            }
        }
    }

    /// Every decodable event from the active source, in file order
    pub fn events(&self) -> Result<Vec<LedgerEvent>> {
        Ok(self.scan()?.map(|scan| scan.events).unwrap_or_default())
    }

    /// Per-loan returned/outstanding status, in ledger order
    pub fn build_outstanding_history(&self) -> Result<Vec<HistoryEntry>> {
        let events = self.events()?;
        Ok(build_outstanding_history(&events))
    }

    // =========================================================================
    // Migration
    // =========================================================================

    /// Rewrite the legacy ledger in the current format
    ///
    /// Only runs when the current file is absent and the legacy one exists.
    /// Titles come from the catalog (empty for books no longer present). The
    /// legacy file is left in place. Returns the number of records written.
    pub fn migrate_legacy(&self, catalog: &Catalog) -> Result<usize> {
        if self.path().exists() || !self.legacy_path.exists() {
            return Ok(0);
        }

        let scan = LedgerReader::scan(&self.legacy_path, LedgerFormat::Legacy)?;
        let events: Vec<LedgerEvent> = scan
            .events
            .into_iter()
            .map(|mut event| {
                if let Some(book) = catalog.get(&event.isbn) {
                    event.title = book.title.clone();
                }
                event
            })
            .collect();

        self.writer.write_new(&events)?;

        info!(
            from = %self.legacy_path.display(),
            to = %self.path().display(),
            records = events.len(),
            skipped = scan.records_corrupt,
            "legacy ledger migrated"
        );
        Ok(events.len())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Path of the current-format ledger
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// Path of the legacy ledger
    pub fn legacy_path(&self) -> &Path {
        &self.legacy_path
    }

    fn scan(&self) -> Result<Option<LedgerScan>> {
        self.source()
            .map(|(path, format)| LedgerReader::scan(path, format))
            .transpose()
    }
}
