//! Ordering Module
//!
//! Re-sequences the catalog by stock or loan volume.
//!
//! ## Approach
//! 1. Extract the live [`BookId`] handles into a vector (random access)
//! 2. Sort that vector in place with an unstable pattern-defeating quicksort
//! 3. Install the sorted handles as the new catalog order
//!
//! Books never move in the arena; only the order vector is permuted, so a
//! sort is O(n log n) regardless of how the catalog grew.
//!
//! Equal keys come out in no particular order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::catalog::{Book, BookId, Catalog};
use crate::error::LibraryError;

/// Sort order for catalog display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Fewest units on the shelf first
    StockAscending,

    /// Most units on loan first
    LoanDescending,
}

impl SortKey {
    /// Compare two books under this key
    pub fn compare(self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortKey::StockAscending => a.stock.cmp(&b.stock),
            SortKey::LoanDescending => b.loaned.cmp(&a.loaned),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::StockAscending => write!(f, "stock"),
            SortKey::LoanDescending => write!(f, "loans"),
        }
    }
}

impl FromStr for SortKey {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stock" => Ok(SortKey::StockAscending),
            "loans" | "loaned" => Ok(SortKey::LoanDescending),
            other => Err(LibraryError::InvalidArgument(format!(
                "unknown sort key: {}",
                other
            ))),
        }
    }
}

/// Permute the catalog into `key` order
pub fn sort_by(catalog: &mut Catalog, key: SortKey) {
    if catalog.len() < 2 {
        return;
    }

    let mut handles = catalog.handles();
    sort_handles(catalog, &mut handles, key);
    catalog.reorder(handles);
}

/// Books in `key` order, leaving the catalog's own order untouched
pub fn sorted(catalog: &Catalog, key: SortKey) -> Vec<&Book> {
    let mut handles = catalog.handles();
    sort_handles(catalog, &mut handles, key);
    handles
        .into_iter()
        .filter_map(|id| catalog.book(id))
        .collect()
}

fn sort_handles(catalog: &Catalog, handles: &mut [BookId], key: SortKey) {
    handles.sort_unstable_by(|a, b| match (catalog.book(*a), catalog.book(*b)) {
        (Some(a), Some(b)) => key.compare(a, b),
        // Handles come straight from the order vector, so every one is live
        _ => Ordering::Equal,
    });
}
