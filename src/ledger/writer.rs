//! Ledger Writer
//!
//! Appends records to the ledger file, one open/write/close per event.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::LedgerSyncStrategy;
use crate::error::Result;

use super::{LedgerEvent, RECORD_SIZE};

/// Appends events to a current-format ledger file
///
/// No file handle is held between appends, so a crash can tear at most the
/// record being written.
#[derive(Debug, Clone)]
pub struct LedgerWriter {
    path: PathBuf,
    sync_strategy: LedgerSyncStrategy,
}

impl LedgerWriter {
    pub fn new(path: impl Into<PathBuf>, sync_strategy: LedgerSyncStrategy) -> Self {
        Self {
            path: path.into(),
            sync_strategy,
        }
    }

    /// Append one record, creating the file if needed
    ///
    /// A partial record left at the end by an interrupted append is cut off
    /// first, so the new record starts on a record boundary.
    pub fn append(&self, event: &LedgerEvent) -> Result<()> {
        let record = event.encode()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.truncate_torn_tail(&file)?;
        file.write_all(&record)?;
        self.finish(&mut file)
    }

    /// Write `events` as a brand-new ledger at `path` (`<path>.tmp`, then rename)
    pub fn write_new(&self, events: &[LedgerEvent]) -> Result<()> {
        let mut bytes = Vec::with_capacity(events.len() * RECORD_SIZE);
        for event in events {
            bytes.extend_from_slice(&event.encode()?);
        }

        let mut tmp_name = self.path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        if let Err(e) = write_synced(&tmp_path, &bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sync_strategy(&self) -> LedgerSyncStrategy {
        self.sync_strategy
    }

    fn truncate_torn_tail(&self, file: &File) -> Result<()> {
        let len = file.metadata()?.len();
        let torn = len % RECORD_SIZE as u64;
        if torn != 0 {
            warn!(
                path = %self.path.display(),
                bytes = torn,
                "truncating partial record at end of ledger before append"
            );
            file.set_len(len - torn)?;
        }
        Ok(())
    }

    fn finish(&self, file: &mut File) -> Result<()> {
        match self.sync_strategy {
            LedgerSyncStrategy::EveryAppend => file.sync_data()?,
            LedgerSyncStrategy::OsBuffered => file.flush()?,
        }
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}
