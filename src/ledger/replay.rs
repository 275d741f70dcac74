//! Ledger Replay
//!
//! Folds ledger events into catalog counters.
//!
//! Loans take `min(stock, qty)` off the shelf and always add the full `qty` to
//! `loaned`; a return larger than `loaned` collapses it to zero. Both rules
//! favor an available catalog over strict conservation, and both are counted
//! in [`ReplayResult`] rather than corrected.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::{LibraryError, Result};

use super::{Action, LedgerEvent, LedgerFormat, LedgerReader};

/// Result of a replay pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Which file was read; `None` when neither ledger exists
    pub source: Option<LedgerFormat>,

    /// Events applied to a book in the catalog
    pub events_applied: u64,

    /// Events whose ISBN is no longer in the catalog
    pub events_orphaned: u64,

    /// Full-size records that failed to decode
    pub records_corrupt: u64,

    /// Loans that needed more stock than the book had
    pub stock_clamped: u64,

    /// Returns that exceeded the loaned count
    pub returns_collapsed: u64,

    /// Whether the file ended in a partial record
    pub torn_tail: bool,
}

/// How a single event landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Exact,
    StockClamped,
    ReturnCollapsed,
    Orphaned,
}

/// Apply one event to the catalog
pub fn apply_event(catalog: &mut Catalog, event: &LedgerEvent) -> Applied {
    let Some(book) = catalog.get_mut(&event.isbn) else {
        return Applied::Orphaned;
    };
    let qty = event.quantity;

    match event.action {
        Action::Loan => {
            let clamped = book.stock < qty;
            book.stock = book.stock.saturating_sub(qty);
            book.loaned = book.loaned.saturating_add(qty);
            if clamped {
                Applied::StockClamped
            } else {
                Applied::Exact
            }
        }
        Action::Return => {
            if book.loaned >= qty {
                book.loaned -= qty;
                book.stock = book.stock.saturating_add(qty);
                Applied::Exact
            } else {
                book.stock = book.stock.saturating_add(book.loaned);
                book.loaned = 0;
                Applied::ReturnCollapsed
            }
        }
    }
}

/// Stream every record of `path` into the catalog
pub(crate) fn replay_file(
    catalog: &mut Catalog,
    path: &Path,
    format: LedgerFormat,
) -> Result<ReplayResult> {
    let mut reader = LedgerReader::open(path, format)?;
    let mut result = ReplayResult {
        source: Some(format),
        ..ReplayResult::default()
    };

    loop {
        let event = match reader.next_event() {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(LibraryError::CorruptRecord(reason)) => {
                warn!(%reason, "skipping corrupt ledger record during replay");
                result.records_corrupt += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        match apply_event(catalog, &event) {
            Applied::Exact => result.events_applied += 1,
            Applied::StockClamped => {
                warn!(
                    isbn = %event.isbn,
                    quantity = event.quantity,
                    "ledger loan exceeds stock; stock clamped to 0"
                );
                result.events_applied += 1;
                result.stock_clamped += 1;
            }
            Applied::ReturnCollapsed => {
                warn!(
                    isbn = %event.isbn,
                    quantity = event.quantity,
                    "ledger return exceeds loans; loaned collapsed to 0"
                );
                result.events_applied += 1;
                result.returns_collapsed += 1;
            }
            Applied::Orphaned => {
                debug!(isbn = %event.isbn, "ledger event for unknown book skipped");
                result.events_orphaned += 1;
            }
        }
    }

    result.torn_tail = reader.torn_tail();

    info!(
        path = %path.display(),
        format = %format,
        applied = result.events_applied,
        orphaned = result.events_orphaned,
        corrupt = result.records_corrupt,
        clamped = result.stock_clamped,
        "ledger replayed"
    );
    Ok(result)
}
