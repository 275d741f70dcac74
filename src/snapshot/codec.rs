//! Snapshot codec
//!
//! Encoding and decoding of the catalog snapshot document.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::catalog::{Book, Catalog, DEFAULT_CATEGORY};
use crate::error::{LibraryError, Result};

/// Snapshot schema version written into the metadata envelope
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Metadata envelope of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub version: String,

    /// Unix seconds at encode time, stored as a string
    pub created: String,
}

impl SnapshotMetadata {
    /// Metadata stamped with the current time
    pub fn now() -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            created: Utc::now().timestamp().to_string(),
        }
    }
}

/// Outcome of a tolerant decode
#[derive(Debug, Default)]
pub struct DecodeReport {
    /// Books restored into the catalog
    pub books_loaded: usize,

    /// Entries dropped (not an object, no isbn/title, duplicate ISBN, ...)
    pub entries_skipped: usize,

    /// Metadata envelope, when present and well-formed
    pub metadata: Option<SnapshotMetadata>,
}

#[derive(Serialize)]
struct SnapshotDocument<'a> {
    metadata: &'a SnapshotMetadata,
    books: Vec<&'a Book>,
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode the catalog, stamping fresh metadata
pub fn encode(catalog: &Catalog) -> Result<Vec<u8>> {
    encode_with_metadata(catalog, &SnapshotMetadata::now())
}

/// Encode the catalog with the given metadata envelope
pub fn encode_with_metadata(catalog: &Catalog, metadata: &SnapshotMetadata) -> Result<Vec<u8>> {
    let document = SnapshotDocument {
        metadata,
        books: catalog.iter().collect(),
    };

    let mut bytes = serde_json::to_vec_pretty(&document)
        .map_err(|e| LibraryError::Serialization(e.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a snapshot into a fresh catalog
pub fn decode(bytes: &[u8]) -> Result<Catalog> {
    decode_with_report(bytes).map(|(catalog, _)| catalog)
}

/// Decode a snapshot, also reporting what was skipped
pub fn decode_with_report(bytes: &[u8]) -> Result<(Catalog, DecodeReport)> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| LibraryError::CorruptSnapshot(format!("unparseable document: {}", e)))?;

    let root = document.as_object().ok_or_else(|| {
        LibraryError::CorruptSnapshot("top-level value is not an object".to_string())
    })?;

    let entries = root.get("books").and_then(Value::as_array).ok_or_else(|| {
        LibraryError::CorruptSnapshot("\"books\" is missing or not an array".to_string())
    })?;

    let mut report = DecodeReport {
        metadata: root.get("metadata").and_then(decode_metadata),
        ..DecodeReport::default()
    };
    let mut catalog = Catalog::new();

    for (position, entry) in entries.iter().enumerate() {
        let Some(book) = decode_book(entry) else {
            warn!(position, "skipping snapshot entry without isbn and title");
            report.entries_skipped += 1;
            continue;
        };

        match catalog.insert(book) {
            Ok(_) => report.books_loaded += 1,
            Err(e) => {
                warn!(position, error = %e, "skipping snapshot entry");
                report.entries_skipped += 1;
            }
        }
    }

    Ok((catalog, report))
}

fn decode_metadata(value: &Value) -> Option<SnapshotMetadata> {
    let fields = value.as_object()?;
    Some(SnapshotMetadata {
        version: string_field(fields, "version")?,
        created: string_field(fields, "created").unwrap_or_default(),
    })
}

fn decode_book(entry: &Value) -> Option<Book> {
    let fields = entry.as_object()?;

    Some(Book {
        isbn: string_field(fields, "isbn")?,
        title: string_field(fields, "title")?,
        author: string_field(fields, "author").unwrap_or_default(),
        category: string_field(fields, "category")
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        stock: count_field(fields, "stock"),
        loaned: count_field(fields, "loaned"),
    })
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Non-negative count; absent or non-numeric reads as 0, out of range clamps
fn count_field(fields: &Map<String, Value>, key: &str) -> u32 {
    let Some(Value::Number(number)) = fields.get(key) else {
        return 0;
    };

    if let Some(n) = number.as_i64() {
        n.clamp(0, i64::from(u32::MAX)) as u32
    } else if number.as_u64().is_some() {
        u32::MAX
    } else {
        number
            .as_f64()
            .map(|f| f.clamp(0.0, f64::from(u32::MAX)) as u32)
            .unwrap_or(0)
    }
}
