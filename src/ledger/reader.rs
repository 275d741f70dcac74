//! Ledger Reader
//!
//! Sequential record reader for either ledger format.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::warn;

use crate::error::{LibraryError, Result};

use super::{LedgerEvent, LedgerFormat, RECORD_SIZE};

/// Reads fixed-size records from a ledger file
pub struct LedgerReader {
    reader: BufReader<File>,
    format: LedgerFormat,

    /// Byte offset of the next record
    position: u64,

    /// Set once a short read at end-of-file was seen
    torn_tail: bool,
}

/// Everything decodable in one ledger file
#[derive(Debug, Clone)]
pub struct LedgerScan {
    pub format: LedgerFormat,
    pub events: Vec<LedgerEvent>,

    /// Full-size records that failed to decode
    pub records_corrupt: u64,

    /// Whether the file ended in a partial record
    pub torn_tail: bool,
}

impl LedgerReader {
    /// Open a ledger file for reading
    pub fn open(path: &Path, format: LedgerFormat) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            format,
            position: 0,
            torn_tail: false,
        })
    }

    /// Read the next record
    ///
    /// Returns:
    /// - `Ok(Some(event))` for a decoded record
    /// - `Ok(None)` at end-of-file, including after a partial trailing record
    /// - `Err(CorruptRecord)` for an undecodable record; the reader has
    ///   already moved past it, so reading can continue
    pub fn next_event(&mut self) -> Result<Option<LedgerEvent>> {
        let size = self.format.record_size();
        let mut buf = [0u8; RECORD_SIZE];
        let record = &mut buf[..size];

        let filled = read_full(&mut self.reader, record)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < size {
            if !self.torn_tail {
                warn!(
                    offset = self.position,
                    bytes = filled,
                    format = %self.format,
                    "ignoring partial record at end of ledger"
                );
            }
            self.torn_tail = true;
            return Ok(None);
        }

        let offset = self.position;
        self.position += size as u64;

        match self.format.decode(record) {
            Ok(event) => Ok(Some(event)),
            Err(LibraryError::CorruptRecord(reason)) => Err(LibraryError::CorruptRecord(format!(
                "offset {}: {}",
                offset, reason
            ))),
            Err(e) => Err(e),
        }
    }

    /// Read the whole file, skipping corrupt records
    pub fn scan(path: &Path, format: LedgerFormat) -> Result<LedgerScan> {
        let mut reader = Self::open(path, format)?;
        let mut events = Vec::new();
        let mut records_corrupt = 0;

        loop {
            match reader.next_event() {
                Ok(Some(event)) => events.push(event),
                Ok(None) => break,
                Err(LibraryError::CorruptRecord(reason)) => {
                    warn!(path = %path.display(), %reason, "skipping corrupt ledger record");
                    records_corrupt += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(LedgerScan {
            format,
            events,
            records_corrupt,
            torn_tail: reader.torn_tail(),
        })
    }

    pub fn format(&self) -> LedgerFormat {
        self.format
    }

    pub fn torn_tail(&self) -> bool {
        self.torn_tail
    }

    /// Iterate over the remaining records
    pub fn events(self) -> LedgerIterator {
        LedgerIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over ledger records
///
/// Corrupt records are yielded as errors without ending iteration; an I/O
/// error ends it.
pub struct LedgerIterator {
    reader: LedgerReader,
    done: bool,
}

impl Iterator for LedgerIterator {
    type Item = Result<LedgerEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e @ LibraryError::CorruptRecord(_)) => Some(Err(e)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
