//! Ledger summary report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An at-a-glance view of the ledger, produced by `InMemoryLedger::summary()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_entries: u64,
    pub allow_count: u64,
    pub deny_count: u64,
    pub first_recorded_at: Option<DateTime<Utc>>,
    pub last_recorded_at: Option<DateTime<Utc>>,
    /// Hash of the last entry, or `GENESIS_HASH` when empty.
    pub head_hash: String,
    /// Result of a full verification at the time of the summary.
    pub integrity_valid: bool,
}
