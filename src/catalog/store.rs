//! Catalog implementation
//!
//! Slot arena with an explicit display order.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{LibraryError, Result};

use super::{Book, BookId, DEFAULT_CATEGORY, MAX_ISBN_LEN};

/// In-memory catalog of books
///
/// The catalog exclusively owns every [`Book`]. Search operations hand back
/// clones so callers can keep or drop results without touching live state.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    /// Book storage; a deleted book leaves `None` behind
    slots: Vec<Option<Book>>,

    /// Live handles in catalog order
    order: Vec<BookId>,

    /// ISBN to handle, for live books only
    index: HashMap<String, BookId>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of books in the catalog
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a new book at the end of the catalog
    ///
    /// The book starts with nothing on loan; a missing category becomes
    /// [`DEFAULT_CATEGORY`].
    pub fn add(
        &mut self,
        isbn: &str,
        title: &str,
        author: &str,
        category: Option<&str>,
        stock: u32,
    ) -> Result<BookId> {
        validate_isbn(isbn)?;
        require_non_empty("title", title)?;
        require_non_empty("author", author)?;

        self.insert(Book::new(isbn, title, author, category, stock))
    }

    /// Insert a fully formed book (loaned count included) at the end
    ///
    /// Used when restoring persisted state. Author and category may be empty
    /// here; ISBN and title may not.
    pub fn insert(&mut self, book: Book) -> Result<BookId> {
        validate_isbn(&book.isbn)?;
        require_non_empty("title", &book.title)?;

        if self.index.contains_key(&book.isbn) {
            return Err(LibraryError::DuplicateKey(book.isbn));
        }

        let id = BookId::new(self.slots.len());
        trace!(isbn = %book.isbn, "catalog insert");
        self.index.insert(book.isbn.clone(), id);
        self.slots.push(Some(book));
        self.order.push(id);
        Ok(id)
    }

    /// Remove a book; the ledger is not touched
    pub fn delete(&mut self, isbn: &str) -> Result<Book> {
        let id = self
            .index
            .remove(isbn)
            .ok_or_else(|| LibraryError::NotFound(isbn.to_string()))?;

        if let Some(position) = self.order.iter().position(|live| *live == id) {
            self.order.remove(position);
        }
        self.slots[id.index()]
            .take()
            .ok_or_else(|| LibraryError::NotFound(isbn.to_string()))
    }

    /// Move `qty` units from stock to loaned
    pub fn loan(&mut self, isbn: &str, qty: u32) -> Result<&Book> {
        require_positive(qty)?;
        let book = self.book_mut(isbn)?;

        if book.stock < qty {
            return Err(LibraryError::InsufficientStock {
                isbn: isbn.to_string(),
                requested: qty,
                available: book.stock,
            });
        }

        book.stock -= qty;
        book.loaned = book.loaned.saturating_add(qty);
        Ok(book)
    }

    /// Move `qty` units from loaned back to stock
    pub fn return_book(&mut self, isbn: &str, qty: u32) -> Result<&Book> {
        require_positive(qty)?;
        let book = self.book_mut(isbn)?;

        if book.loaned < qty {
            return Err(LibraryError::OverReturn {
                isbn: isbn.to_string(),
                requested: qty,
                loaned: book.loaned,
            });
        }

        book.loaned -= qty;
        book.stock = book.stock.saturating_add(qty);
        Ok(book)
    }

    /// Overwrite descriptive fields and stock; `loaned` is kept
    pub fn update(
        &mut self,
        isbn: &str,
        title: &str,
        author: &str,
        category: Option<&str>,
        stock: u32,
    ) -> Result<&Book> {
        require_non_empty("title", title)?;
        require_non_empty("author", author)?;

        let book = self.book_mut(isbn)?;
        book.title = title.to_string();
        book.author = author.to_string();
        book.category = category.unwrap_or(DEFAULT_CATEGORY).to_string();
        book.stock = stock;
        Ok(book)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Borrow the live book with this ISBN
    pub fn get(&self, isbn: &str) -> Option<&Book> {
        self.index.get(isbn).and_then(|id| self.book(*id))
    }

    /// Borrow the book behind a handle (None once deleted)
    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, isbn: &str) -> Option<&mut Book> {
        let id = *self.index.get(isbn)?;
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Exact ISBN match, as an independent copy
    pub fn find_exact(&self, isbn: &str) -> Option<Book> {
        self.get(isbn).cloned()
    }

    /// Exact title match
    pub fn find_by_title(&self, title: &str) -> Vec<Book> {
        self.collect_where(|book| book.title == title)
    }

    /// Exact author match
    pub fn find_by_author(&self, author: &str) -> Vec<Book> {
        self.collect_where(|book| book.author == author)
    }

    /// Substring match against title, author or category
    pub fn find_by_keyword(&self, keyword: &str) -> Vec<Book> {
        self.collect_where(|book| book.matches_keyword(keyword))
    }

    /// Iterate over books in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Book> + '_ {
        self.order.iter().filter_map(move |id| self.book(*id))
    }

    /// Live handles in catalog order
    pub fn handles(&self) -> Vec<BookId> {
        self.order.clone()
    }

    /// Replace the catalog order with a permutation of the live handles
    pub(crate) fn reorder(&mut self, order: Vec<BookId>) {
        debug_assert_eq!(order.len(), self.order.len());
        self.order = order;
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn book_mut(&mut self, isbn: &str) -> Result<&mut Book> {
        self.get_mut(isbn)
            .ok_or_else(|| LibraryError::NotFound(isbn.to_string()))
    }

    fn collect_where<F>(&self, predicate: F) -> Vec<Book>
    where
        F: Fn(&Book) -> bool,
    {
        self.iter().filter(|book| predicate(book)).cloned().collect()
    }
}

fn validate_isbn(isbn: &str) -> Result<()> {
    require_non_empty("isbn", isbn)?;
    if isbn.len() > MAX_ISBN_LEN {
        return Err(LibraryError::InvalidArgument(format!(
            "isbn must be at most {} bytes, got {}",
            MAX_ISBN_LEN,
            isbn.len()
        )));
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(LibraryError::InvalidArgument(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_positive(qty: u32) -> Result<()> {
    if qty == 0 {
        return Err(LibraryError::InvalidArgument(
            "quantity must be positive".to_string(),
        ));
    }
    Ok(())
}
