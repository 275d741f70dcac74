//! Loan history
//!
//! Works out which individual loans have been returned.
//!
//! Every loan event opens a lot holding its quantity. A return for an ISBN
//! drains that ISBN's open lots oldest first until the returned quantity is
//! used up; anything left over is dropped. Each ISBN is effectively its own
//! FIFO queue of open lots.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use chrono::{Local, TimeZone};

use super::{Action, LedgerEvent};

/// Whether a loan has been fully returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Returned,
    Outstanding,
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Returned => write!(f, "returned"),
            LoanStatus::Outstanding => write!(f, "outstanding"),
        }
    }
}

/// One loan event and how much of it is still out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub status: LoanStatus,

    /// Unix seconds of the loan
    pub timestamp: i64,

    pub title: String,
    pub isbn: String,

    /// Units originally loaned
    pub quantity: u32,

    /// Units not yet matched by a return
    pub remaining: u32,
}

impl HistoryEntry {
    /// Loan time as local `YYYY-MM-DD HH:MM:SS`
    pub fn formatted_time(&self) -> String {
        Local
            .timestamp_opt(self.timestamp, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.status,
            self.formatted_time(),
            self.title
        )
    }
}

/// Match returns against loans and report every loan in ledger order
pub fn build_outstanding_history<'a, I>(events: I) -> Vec<HistoryEntry>
where
    I: IntoIterator<Item = &'a LedgerEvent>,
{
    let mut lots: Vec<HistoryEntry> = Vec::new();
    let mut open: HashMap<&'a str, VecDeque<usize>> = HashMap::new();

    for event in events {
        match event.action {
            Action::Loan => {
                open.entry(event.isbn.as_str())
                    .or_default()
                    .push_back(lots.len());
                lots.push(HistoryEntry {
                    status: LoanStatus::Outstanding,
                    timestamp: event.timestamp,
                    title: event.title.clone(),
                    isbn: event.isbn.clone(),
                    quantity: event.quantity,
                    remaining: event.quantity,
                });
            }
            Action::Return => {
                let Some(queue) = open.get_mut(event.isbn.as_str()) else {
                    continue;
                };

                let mut left = event.quantity;
                while left > 0 {
                    let Some(&index) = queue.front() else {
                        break;
                    };
                    let lot = &mut lots[index];
                    let used = lot.remaining.min(left);
                    lot.remaining -= used;
                    left -= used;
                    if lot.remaining == 0 {
                        queue.pop_front();
                    }
                }
            }
        }
    }

    for lot in &mut lots {
        if lot.remaining == 0 {
            lot.status = LoanStatus::Returned;
        }
    }
    lots
}
