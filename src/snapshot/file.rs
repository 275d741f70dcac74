//! Snapshot files
//!
//! Loading and atomically replacing snapshot files on disk.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{LibraryError, Result};

use super::codec::{decode_with_report, encode, DecodeReport};

/// Write the catalog to `path`, replacing any previous snapshot atomically
pub fn save(path: &Path, catalog: &Catalog) -> Result<()> {
    let bytes = encode(catalog)?;
    let tmp_path = temp_path(path)?;

    if let Err(e) = write_synced(&tmp_path, &bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    info!(
        path = %path.display(),
        books = catalog.len(),
        bytes = bytes.len(),
        "snapshot saved"
    );
    Ok(())
}

/// Read and decode the snapshot at `path`
pub fn load(path: &Path) -> Result<Catalog> {
    load_with_report(path).map(|(catalog, _)| catalog)
}

/// Read and decode the snapshot at `path`, with the decode report
pub fn load_with_report(path: &Path) -> Result<(Catalog, DecodeReport)> {
    let bytes = fs::read(path)?;
    let (catalog, report) = decode_with_report(&bytes)?;

    debug!(
        path = %path.display(),
        loaded = report.books_loaded,
        skipped = report.entries_skipped,
        "snapshot decoded"
    );
    Ok((catalog, report))
}

// =============================================================================
// Private Helpers
// =============================================================================

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

/// "catalog.json" → "catalog.json.tmp", next to the target
fn temp_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        LibraryError::InvalidArgument(format!("snapshot path has no file name: {}", path.display()))
    })?;

    let mut tmp_name = OsString::from(name);
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}
