//! Snapshot Module
//!
//! Full point-in-time serialization of the catalog as pretty-printed JSON.
//!
//! ## Document Shape
//! ```text
//! {
//!   "metadata": { "version": "1.0", "created": "1760608800" },
//!   "books": [
//!     { "isbn": "...", "title": "...", "author": "...",
//!       "category": "...", "stock": 3, "loaned": 1 },
//!     ...
//!   ]
//! }
//! ```
//!
//! ## Decoding Policy
//! - Unknown keys anywhere are ignored, whatever their value type
//! - Key order does not matter
//! - Missing `stock`/`loaned` read as 0, missing `category` as the default
//! - A book without a string `isbn` and `title` is skipped, not fatal
//! - Only a non-object document or a non-array `books` is `CorruptSnapshot`
//!
//! ## Saving
//! Snapshots are written to `<path>.tmp`, fsynced, then renamed over the
//! previous file, so a failed save leaves the last good snapshot in place.

mod codec;
mod file;

pub use codec::{
    decode, decode_with_report, encode, encode_with_metadata, DecodeReport, SnapshotMetadata,
    SNAPSHOT_VERSION,
};
pub use file::{load, load_with_report, save};
