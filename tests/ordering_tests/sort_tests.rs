//! Ordering Tests
//!
//! Tests verify:
//! - Stock-ascending and loan-descending permutations
//! - Sorting keeps every book and its counters
//! - The sorted view leaves catalog order alone
//! - Sort key parsing

use std::str::FromStr;

use bookledger::catalog::Catalog;
use bookledger::ordering::{self, SortKey};

// =============================================================================
// Helper Functions
// =============================================================================

/// Catalog whose books have the given stock and loaned counts, ISBNs "B0", "B1", ...
fn catalog_with(counts: &[(u32, u32)]) -> Catalog {
    let mut catalog = Catalog::new();
    for (i, &(stock, loaned)) in counts.iter().enumerate() {
        let isbn = format!("B{}", i);
        catalog
            .add(&isbn, &format!("Title {}", i), "Author", None, stock + loaned)
            .unwrap();
        if loaned > 0 {
            catalog.loan(&isbn, loaned).unwrap();
        }
    }
    catalog
}

fn stocks(catalog: &Catalog) -> Vec<u32> {
    catalog.iter().map(|b| b.stock).collect()
}

fn loans(catalog: &Catalog) -> Vec<u32> {
    catalog.iter().map(|b| b.loaned).collect()
}

fn sorted_isbns(catalog: &Catalog) -> Vec<String> {
    let mut isbns: Vec<String> = catalog.iter().map(|b| b.isbn.clone()).collect();
    isbns.sort();
    isbns
}

// =============================================================================
// Stock Ordering Tests
// =============================================================================

#[test]
fn test_sort_by_stock_ascending() {
    let mut catalog = catalog_with(&[(5, 0), (1, 0), (3, 0)]);

    ordering::sort_by(&mut catalog, SortKey::StockAscending);

    assert_eq!(stocks(&catalog), vec![1, 3, 5]);
    let order: Vec<&str> = catalog.iter().map(|b| b.isbn.as_str()).collect();
    assert_eq!(order, vec!["B1", "B2", "B0"]);
}

#[test]
fn test_sort_by_stock_with_ties() {
    let mut catalog = catalog_with(&[(2, 0), (0, 0), (2, 0), (1, 0), (0, 0)]);

    ordering::sort_by(&mut catalog, SortKey::StockAscending);

    assert_eq!(stocks(&catalog), vec![0, 0, 1, 2, 2]);
}

#[test]
fn test_sort_by_stock_already_sorted() {
    let mut catalog = catalog_with(&[(1, 0), (2, 0), (3, 0)]);

    ordering::sort_by(&mut catalog, SortKey::StockAscending);

    assert_eq!(stocks(&catalog), vec![1, 2, 3]);
}

// =============================================================================
// Loan Ordering Tests
// =============================================================================

#[test]
fn test_sort_by_loans_descending() {
    let mut catalog = catalog_with(&[(1, 0), (1, 4), (1, 2)]);

    ordering::sort_by(&mut catalog, SortKey::LoanDescending);

    assert_eq!(loans(&catalog), vec![4, 2, 0]);
}

#[test]
fn test_sort_keeps_books_and_counters() {
    let mut catalog = catalog_with(&[(3, 1), (0, 7), (9, 0), (2, 2)]);
    let before = sorted_isbns(&catalog);
    let b1 = catalog.get("B1").cloned().unwrap();

    ordering::sort_by(&mut catalog, SortKey::LoanDescending);

    assert_eq!(catalog.len(), 4);
    assert_eq!(sorted_isbns(&catalog), before);
    assert_eq!(catalog.get("B1").unwrap(), &b1);
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn test_sort_empty_catalog() {
    let mut catalog = Catalog::new();
    ordering::sort_by(&mut catalog, SortKey::StockAscending);
    assert!(catalog.is_empty());
}

#[test]
fn test_sort_single_book() {
    let mut catalog = catalog_with(&[(4, 1)]);
    ordering::sort_by(&mut catalog, SortKey::LoanDescending);
    assert_eq!(stocks(&catalog), vec![4]);
}

#[test]
fn test_sort_after_deletes() {
    let mut catalog = catalog_with(&[(5, 0), (4, 0), (3, 0), (2, 0), (1, 0)]);
    catalog.delete("B1").unwrap();
    catalog.delete("B3").unwrap();

    ordering::sort_by(&mut catalog, SortKey::StockAscending);

    assert_eq!(stocks(&catalog), vec![1, 3, 5]);
}

#[test]
fn test_add_after_sort_appends_at_end() {
    let mut catalog = catalog_with(&[(5, 0), (1, 0)]);
    ordering::sort_by(&mut catalog, SortKey::StockAscending);

    catalog.add("NEW", "New", "A", None, 0).unwrap();

    assert_eq!(stocks(&catalog), vec![1, 5, 0]);
}

#[test]
fn test_sort_large_catalog() {
    let counts: Vec<(u32, u32)> = (0..5_000u32).map(|i| ((i * 7919) % 5_000, 0)).collect();
    let mut catalog = catalog_with(&counts);

    ordering::sort_by(&mut catalog, SortKey::StockAscending);

    let sorted = stocks(&catalog);
    assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(sorted.len(), 5_000);
}

// =============================================================================
// Sorted View Tests
// =============================================================================

#[test]
fn test_sorted_view_leaves_catalog_order() {
    let catalog = catalog_with(&[(5, 0), (1, 0), (3, 0)]);

    let view: Vec<u32> = ordering::sorted(&catalog, SortKey::StockAscending)
        .iter()
        .map(|b| b.stock)
        .collect();

    assert_eq!(view, vec![1, 3, 5]);
    assert_eq!(stocks(&catalog), vec![5, 1, 3]);
}

// =============================================================================
// Sort Key Tests
// =============================================================================

#[test]
fn test_sort_key_parse() {
    assert_eq!(SortKey::from_str("stock").unwrap(), SortKey::StockAscending);
    assert_eq!(SortKey::from_str("loans").unwrap(), SortKey::LoanDescending);
    assert_eq!(SortKey::from_str("loaned").unwrap(), SortKey::LoanDescending);
    assert!(SortKey::from_str("title").is_err());
}

#[test]
fn test_sort_key_display_round_trips() {
    for key in [SortKey::StockAscending, SortKey::LoanDescending] {
        assert_eq!(key.to_string().parse::<SortKey>().unwrap(), key);
    }
}
