//! Library Module
//!
//! Coordinates the catalog, snapshot files, the ledger and the audit log.
//!
//! ## Responsibilities
//! - Load the catalog at startup (snapshot, legacy snapshot, or empty)
//! - Optionally replay the ledger into the loaded catalog
//! - Mirror every loan/return into the ledger after it succeeds in memory
//! - Re-sequence the catalog on demand
//! - Save the catalog back to its snapshot

use std::fs;
use std::path::Path;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::catalog::{Book, Catalog};
use crate::config::Config;
use crate::error::{LibraryError, Result};
use crate::ledger::{Action, HistoryEntry, Ledger, LedgerEvent, ReplayResult};
use crate::ordering::{self, SortKey};
use crate::snapshot;

/// Where the catalog came from when the library was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// The configured snapshot file
    Snapshot,

    /// The legacy snapshot file, since copied to the configured snapshot
    LegacySnapshot,

    /// Nothing loadable; started empty
    Empty,
}

/// A library instance
///
/// ## Concurrency Model
/// Requests are expected one at a time. The catalog still sits behind a
/// `RwLock` so every method can take `&self`; mutations hold the write lock
/// only for the in-memory change, and ledger/audit appends happen after it is
/// released.
pub struct Library {
    config: Config,
    catalog: RwLock<Catalog>,
    ledger: Ledger,
    audit: AuditLog,
    origin: CatalogOrigin,
}

impl Library {
    /// Open or create a library with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Load the snapshot, falling back to the legacy snapshot, then empty
    /// 3. Replay the ledger if `replay_on_open` is set
    ///
    /// Only step 1 can fail.
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let (mut catalog, origin) = Self::load_catalog(&config);
        let ledger = Ledger::from_config(&config);

        if config.replay_on_open {
            if let Err(e) = ledger.replay(&mut catalog) {
                warn!(error = %e, "ledger replay failed; continuing with snapshot counters");
            }
        }

        info!(
            data_dir = %config.data_dir.display(),
            books = catalog.len(),
            origin = ?origin,
            "library opened"
        );

        Ok(Self {
            audit: AuditLog::new(config.audit_path()),
            config,
            catalog: RwLock::new(catalog),
            ledger,
            origin,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    fn load_catalog(config: &Config) -> (Catalog, CatalogOrigin) {
        let primary = config.snapshot_path();

        let replace_primary = match snapshot::load(&primary) {
            Ok(catalog) => return (catalog, CatalogOrigin::Snapshot),
            Err(LibraryError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %primary.display(), "no snapshot yet");
                true
            }
            Err(e @ LibraryError::CorruptSnapshot(_)) => {
                warn!(path = %primary.display(), error = %e, "snapshot unusable");
                true
            }
            Err(e) => {
                warn!(path = %primary.display(), error = %e, "snapshot unreadable");
                false
            }
        };

        let legacy = config.legacy_snapshot_path();
        match snapshot::load(&legacy) {
            Ok(catalog) => {
                info!(path = %legacy.display(), books = catalog.len(), "loaded legacy snapshot");
                if replace_primary {
                    if let Err(e) = snapshot::save(&primary, &catalog) {
                        warn!(path = %primary.display(), error = %e, "could not migrate legacy snapshot");
                    }
                }
                (catalog, CatalogOrigin::LegacySnapshot)
            }
            Err(e) => {
                debug!(path = %legacy.display(), error = %e, "no legacy snapshot");
                (Catalog::new(), CatalogOrigin::Empty)
            }
        }
    }

    // =========================================================================
    // Catalog Mutations
    // =========================================================================

    /// Add a new book
    pub fn add_book(
        &self,
        isbn: &str,
        title: &str,
        author: &str,
        category: Option<&str>,
        stock: u32,
    ) -> Result<()> {
        self.catalog
            .write()
            .add(isbn, title, author, category, stock)?;
        self.audit.record("add", isbn, title);
        Ok(())
    }

    /// Delete a book; its ledger history stays
    pub fn delete_book(&self, isbn: &str) -> Result<Book> {
        let book = self.catalog.write().delete(isbn)?;
        self.audit.record("delete", isbn, &book.title);
        Ok(book)
    }

    /// Edit title, author, category and stock
    pub fn update_book(
        &self,
        isbn: &str,
        title: &str,
        author: &str,
        category: Option<&str>,
        stock: u32,
    ) -> Result<Book> {
        let book = self
            .catalog
            .write()
            .update(isbn, title, author, category, stock)?
            .clone();
        self.audit.record("update", isbn, &book.title);
        Ok(book)
    }

    /// Loan `qty` units, then record the loan in the ledger
    pub fn loan(&self, isbn: &str, qty: u32) -> Result<Book> {
        let book = self.catalog.write().loan(isbn, qty)?.clone();
        self.ledger.append(Action::Loan, &book.isbn, &book.title, qty);
        self.audit.record("loan", isbn, &book.title);
        Ok(book)
    }

    /// Take back `qty` units, then record the return in the ledger
    pub fn return_book(&self, isbn: &str, qty: u32) -> Result<Book> {
        let book = self.catalog.write().return_book(isbn, qty)?.clone();
        self.ledger.append(Action::Return, &book.isbn, &book.title, qty);
        self.audit.record("return", isbn, &book.title);
        Ok(book)
    }

    /// Permanently re-sequence the catalog
    pub fn sort(&self, key: SortKey) {
        ordering::sort_by(&mut self.catalog.write(), key);
        debug!(key = %key, "catalog sorted");
    }

    /// Fold the ledger into the live catalog
    pub fn replay(&self) -> Result<ReplayResult> {
        self.ledger.replay(&mut self.catalog.write())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn find_exact(&self, isbn: &str) -> Option<Book> {
        self.catalog.read().find_exact(isbn)
    }

    pub fn find_by_title(&self, title: &str) -> Vec<Book> {
        self.catalog.read().find_by_title(title)
    }

    pub fn find_by_author(&self, author: &str) -> Vec<Book> {
        self.catalog.read().find_by_author(author)
    }

    pub fn find_by_keyword(&self, keyword: &str) -> Vec<Book> {
        self.catalog.read().find_by_keyword(keyword)
    }

    /// Flat per-book records in catalog order
    pub fn records(&self) -> Vec<Book> {
        self.catalog.read().iter().cloned().collect()
    }

    /// Books in `key` order without changing the catalog order
    pub fn sorted(&self, key: SortKey) -> Vec<Book> {
        ordering::sorted(&self.catalog.read(), key)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Per-loan returned/outstanding status
    pub fn outstanding_history(&self) -> Result<Vec<HistoryEntry>> {
        self.ledger.build_outstanding_history()
    }

    /// Every ledger event, for export
    pub fn ledger_events(&self) -> Result<Vec<LedgerEvent>> {
        self.ledger.events()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Rewrite a legacy ledger in the current format
    pub fn migrate_ledger(&self) -> Result<usize> {
        self.ledger.migrate_legacy(&self.catalog.read())
    }

    /// Copy the audit log to `dest`
    pub fn export_audit_log(&self, dest: &Path) -> Result<u64> {
        self.audit.export_to(dest)
    }

    /// Write the catalog to its snapshot file
    pub fn save(&self) -> Result<()> {
        snapshot::save(&self.config.snapshot_path(), &self.catalog.read())
    }

    /// Save and shut down
    pub fn close(self) -> Result<()> {
        self.save()?;
        if self.ledger.failed_appends() > 0 {
            warn!(
                failed = self.ledger.failed_appends(),
                "ledger appends were lost this session"
            );
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    /// Number of books in the catalog
    pub fn len(&self) -> usize {
        self.catalog.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.read().is_empty()
    }
}
