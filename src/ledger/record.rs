//! Ledger record definitions
//!
//! Fixed-layout binary records, little-endian, NUL-padded text fields.

use std::fmt;

use chrono::Utc;

use crate::error::{LibraryError, Result};

/// Width of the NUL-padded ISBN field
pub const ISBN_WIDTH: usize = 20;

/// Width of the NUL-padded title field
pub const TITLE_WIDTH: usize = 100;

/// action (4) + isbn (20) + title (100) + quantity (4) + timestamp (8)
pub const RECORD_SIZE: usize = 4 + ISBN_WIDTH + TITLE_WIDTH + 4 + 8;

/// isbn (20) + quantity (4) + timestamp (8)
pub const LEGACY_RECORD_SIZE: usize = ISBN_WIDTH + 4 + 8;

/// Kind of ledger event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Loan,
    Return,
}

impl Action {
    /// On-disk action code
    pub fn code(self) -> i32 {
        match self {
            Action::Loan => 1,
            Action::Return => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Action::Loan),
            2 => Some(Action::Return),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Loan => write!(f, "loan"),
            Action::Return => write!(f, "return"),
        }
    }
}

/// On-disk record layout of a ledger file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFormat {
    /// `{ action, isbn[20], title[100], quantity, timestamp }`
    Current,

    /// `{ isbn[20], quantity, timestamp }`, every record a loan
    Legacy,
}

impl LedgerFormat {
    pub fn record_size(self) -> usize {
        match self {
            LedgerFormat::Current => RECORD_SIZE,
            LedgerFormat::Legacy => LEGACY_RECORD_SIZE,
        }
    }

    /// Decode one record of this format
    pub fn decode(self, bytes: &[u8]) -> Result<LedgerEvent> {
        match self {
            LedgerFormat::Current => LedgerEvent::decode(bytes),
            LedgerFormat::Legacy => LedgerEvent::decode_legacy(bytes),
        }
    }
}

impl fmt::Display for LedgerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerFormat::Current => write!(f, "current"),
            LedgerFormat::Legacy => write!(f, "legacy"),
        }
    }
}

/// One loan or return, as recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEvent {
    pub action: Action,
    pub isbn: String,

    /// Title at the time of the event; empty for legacy records
    pub title: String,

    pub quantity: u32,

    /// Unix seconds
    pub timestamp: i64,
}

impl LedgerEvent {
    /// Create an event stamped with the current time
    pub fn new(
        action: Action,
        isbn: impl Into<String>,
        title: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            action,
            isbn: isbn.into(),
            title: title.into(),
            quantity,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Replace the timestamp
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Encode into a current-format record
    ///
    /// The title is cut to fit its field; an ISBN that does not fit is an error
    /// because replay matches on it.
    pub fn encode(&self) -> Result<[u8; RECORD_SIZE]> {
        if self.isbn.is_empty() || self.isbn.len() >= ISBN_WIDTH {
            return Err(LibraryError::InvalidArgument(format!(
                "isbn does not fit a ledger record: {:?}",
                self.isbn
            )));
        }
        let quantity = i32::try_from(self.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                LibraryError::InvalidArgument(format!(
                    "quantity out of range for a ledger record: {}",
                    self.quantity
                ))
            })?;

        let mut record = [0u8; RECORD_SIZE];
        record[0..4].copy_from_slice(&self.action.code().to_le_bytes());
        put_text(&mut record[4..24], &self.isbn);
        put_text(&mut record[24..124], &self.title);
        record[124..128].copy_from_slice(&quantity.to_le_bytes());
        record[128..136].copy_from_slice(&self.timestamp.to_le_bytes());
        Ok(record)
    }

    /// Decode a current-format record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let record = exact(bytes, RECORD_SIZE)?;

        let code = le_i32(&record[0..4]);
        let action = Action::from_code(code)
            .ok_or_else(|| LibraryError::CorruptRecord(format!("unknown action code {}", code)))?;

        Ok(Self {
            action,
            isbn: take_text(&record[4..24]),
            title: take_text(&record[24..124]),
            quantity: positive_quantity(le_i32(&record[124..128]))?,
            timestamp: le_i64(&record[128..136]),
        })
    }

    /// Decode a legacy record; it is always a loan and carries no title
    pub fn decode_legacy(bytes: &[u8]) -> Result<Self> {
        let record = exact(bytes, LEGACY_RECORD_SIZE)?;

        Ok(Self {
            action: Action::Loan,
            isbn: take_text(&record[0..20]),
            title: String::new(),
            quantity: positive_quantity(le_i32(&record[20..24]))?,
            timestamp: le_i64(&record[24..32]),
        })
    }
}

// =============================================================================
// Field Helpers
// =============================================================================

fn exact(bytes: &[u8], size: usize) -> Result<&[u8]> {
    if bytes.len() != size {
        return Err(LibraryError::CorruptRecord(format!(
            "expected {} bytes, got {}",
            size,
            bytes.len()
        )));
    }
    Ok(bytes)
}

fn positive_quantity(raw: i32) -> Result<u32> {
    u32::try_from(raw)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| LibraryError::CorruptRecord(format!("non-positive quantity {}", raw)))
}

fn le_i32(bytes: &[u8]) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    i32::from_le_bytes(buf)
}

fn le_i64(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    i64::from_le_bytes(buf)
}

/// Copy `text` into a zeroed field, leaving room for the NUL terminator
fn put_text(field: &mut [u8], text: &str) {
    let mut end = text.len().min(field.len() - 1);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    field[..end].copy_from_slice(&text.as_bytes()[..end]);
}

/// Text up to the first NUL
fn take_text(field: &[u8]) -> String {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
