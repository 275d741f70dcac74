//! # bookledger
//!
//! Persistence and reconciliation core of a small library's catalog:
//! - An in-memory catalog of books (stock and on-loan counts)
//! - Human-readable JSON snapshots, replaced atomically on save
//! - An append-only binary ledger of every loan and return
//! - Ledger replay, including the older loan-only record format
//! - Catalog ordering by stock or by loan volume
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CLI / Caller                            │
//! │              (one request at a time)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Library                                │
//! └──────┬──────────────────┬──────────────────┬────────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//!  ┌───────────┐     ┌─────────────┐    ┌─────────────┐
//!  │  Catalog  │◄────│   Ledger    │    │  Audit Log  │
//!  │ (arena)   │     │  (append)   │    │   (text)    │
//!  └─────┬─────┘     └─────────────┘    └─────────────┘
//!        │
//!   ┌────┴─────────────┐
//!   ▼                  ▼
//! ┌─────────────┐  ┌─────────────┐
//! │  Snapshot   │  │  Ordering   │
//! │   (JSON)    │  │             │
//! └─────────────┘  └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod catalog;
pub mod ordering;
pub mod snapshot;
pub mod ledger;
pub mod audit;
pub mod library;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LibraryError, Result};
pub use config::Config;
pub use catalog::{Book, Catalog};
pub use ordering::SortKey;
pub use library::Library;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bookledger
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
