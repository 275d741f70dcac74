//! Operation audit log
//!
//! Human-readable, append-only text log of catalog mutations:
//!
//! ```text
//! 2026-10-16 09:30:12 | add | ISBN:9780131103627 | title:The C Programming Language
//! ```
//!
//! Writes are best effort, the same as ledger appends.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::warn;

use crate::error::Result;

/// Text log of catalog operations
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one line; failures are logged and dropped
    pub fn record(&self, action: &str, isbn: &str, title: &str) {
        let time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let line = format_line(&time, action, isbn, title);

        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = written {
            warn!(path = %self.path.display(), action, error = %e, "audit log write failed");
        }
    }

    /// Copy the whole log to `dest`; returns bytes copied
    pub fn export_to(&self, dest: &Path) -> Result<u64> {
        Ok(fs::copy(&self.path, dest)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn format_line(time: &str, action: &str, isbn: &str, title: &str) -> String {
    let mut line = format!("{} | {}", time, action);
    if !isbn.is_empty() {
        line.push_str(" | ISBN:");
        line.push_str(isbn);
    }
    if !title.is_empty() {
        line.push_str(" | title:");
        line.push_str(title);
    }
    line.push('\n');
    line
}
