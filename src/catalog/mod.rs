//! Catalog Module
//!
//! In-memory store of every book the library owns.
//!
//! ## Responsibilities
//! - CRUD on books keyed by ISBN (exact, case-sensitive)
//! - Loan/return counters with `stock >= 0` and `loaned >= 0`
//! - Exact and keyword search returning independent copies
//! - Insertion order preserved until explicitly re-sorted
//!
//! ## Data Structure Choice
//! An arena of slots addressed by [`BookId`] plus a separate order vector:
//! - Handles stay valid across deletes (slots are never reused)
//! - Re-sorting only permutes the order vector
//! - An ISBN index makes key lookups and duplicate checks O(1); title,
//!   author and keyword searches stay linear scans

mod store;

pub use store::Catalog;

use serde::{Deserialize, Serialize};

/// Category assigned when a book is added or loaded without one
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Longest ISBN the ledger's fixed 20-byte field can hold (NUL-terminated)
pub const MAX_ISBN_LEN: usize = 19;

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: String,

    /// Units on the shelf, available to loan
    pub stock: u32,

    /// Units currently checked out
    pub loaned: u32,
}

impl Book {
    /// Create a book with nothing on loan
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        category: Option<&str>,
        stock: u32,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            category: category.unwrap_or(DEFAULT_CATEGORY).to_string(),
            stock,
            loaned: 0,
        }
    }

    /// Units owned in total; conserved by loan and return
    pub fn total_units(&self) -> u64 {
        u64::from(self.stock) + u64::from(self.loaned)
    }

    /// Whether title, author or category contains `keyword`
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        self.title.contains(keyword)
            || self.author.contains(keyword)
            || self.category.contains(keyword)
    }
}

/// Stable handle to a book slot inside a [`Catalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(usize);

impl BookId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}
