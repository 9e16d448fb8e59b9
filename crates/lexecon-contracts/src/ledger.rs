//! Ledger entry and verification report types.
//!
//! `LedgerEntry` wraps a recorded `Decision` with its chain position and the
//! SHA-256 hashes that make tampering detectable. `VerificationReport` is the
//! result of re-walking the chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::Decision;

/// A single entry in the decision ledger.
///
/// Each entry commits to its predecessor through `previous_hash`. Changing
/// any hashed field (sequence, recorded_at, the decision payload, or
/// previous_hash) invalidates `hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the chain, starting at 0, no gaps.
    pub sequence: u64,

    /// Wall-clock time (UTC) the entry was appended.
    pub recorded_at: DateTime<Utc>,

    /// The recorded decision. Its `ledger_sequence` is always `None` here.
    pub decision: Decision,

    /// Hash of the previous entry, or `GENESIS_HASH` for entry 0.
    pub previous_hash: String,

    /// SHA-256 (lowercase hex) over this entry's canonical bytes.
    pub hash: String,
}

impl LedgerEntry {
    /// The `previous_hash` of entry 0: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";

    /// The recorded decision with its ledger position filled in, as handed
    /// back to callers.
    pub fn recorded_decision(&self) -> Decision {
        Decision {
            ledger_sequence: Some(self.sequence),
            ..self.decision.clone()
        }
    }
}

/// What kind of integrity violation verification found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The chain verified.
    None,
    /// An entry's stored hash does not match the hash recomputed from its
    /// contents.
    HashMismatch,
    /// An entry's `previous_hash` does not match its predecessor's hash.
    LinkageMismatch,
    /// An entry's sequence number is not the next expected number (missing
    /// or duplicate entry).
    SequenceGap,
}

/// The outcome of verifying the whole chain.
///
/// A failed report is a finding, not an error: the ledger never auto-heals
/// and keeps accepting appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True if every entry passed every check. An empty chain is valid.
    pub valid: bool,

    /// Number of entries examined before stopping.
    pub entries_checked: u64,

    /// Sequence number (chain position) of the first offending entry.
    pub first_failure: Option<u64>,

    pub failure_kind: FailureKind,

    /// Stored hash of the last entry in the snapshot, or `GENESIS_HASH` for
    /// an empty chain.
    pub head_hash: String,

    /// Human-readable description of the failure, if any.
    pub detail: Option<String>,
}

impl VerificationReport {
    /// A passing report over `entries_checked` entries.
    pub fn intact(entries_checked: u64, head_hash: impl Into<String>) -> Self {
        Self {
            valid: true,
            entries_checked,
            first_failure: None,
            failure_kind: FailureKind::None,
            head_hash: head_hash.into(),
            detail: None,
        }
    }
}
