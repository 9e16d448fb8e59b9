//! In-memory implementation of `DecisionLedger`.
//!
//! `InMemoryLedger` keeps every entry as a shared `Arc` in a `Vec` behind an
//! `RwLock`. Appends take the write lock, which makes sequence assignment and
//! tip advancement a single critical section. Readers take the read lock
//! only long enough to clone the `Arc`s, then work on that snapshot, so
//! `verify()` never blocks appends for the length of a full chain walk.
//!
//! An entry is pushed only after it is fully built, so a snapshot never
//! contains a partially written entry.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::Utc;
use tracing::{debug, info};

use lexecon_contracts::{
    decision::{Decision, Outcome},
    error::{LexeconError, LexeconResult},
    ledger::{LedgerEntry, VerificationReport},
};
use lexecon_core::traits::DecisionLedger;

use crate::{
    chain::{canonical_payload, hash_entry, verify_chain},
    summary::LedgerSummary,
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct ChainState {
    /// All entries appended so far, in sequence order.
    pub(crate) entries: Vec<Arc<LedgerEntry>>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) next_sequence: u64,

    /// Stored hash of the last appended entry, or `GENESIS_HASH`.
    pub(crate) tip_hash: String,
}

// ── Public ledger ─────────────────────────────────────────────────────────────

/// An in-memory, append-only decision ledger backed by a SHA-256 hash chain.
///
/// Created empty; lives as long as its owner. Share it with
/// `Arc<InMemoryLedger>` to keep a read handle next to the pipeline.
pub struct InMemoryLedger {
    pub(crate) state: RwLock<ChainState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ChainState {
                entries: Vec::new(),
                next_sequence: 0,
                tip_hash: LedgerEntry::GENESIS_HASH.to_string(),
            }),
        }
    }

    /// Readers recover from a poisoned lock: entries are pushed whole, so
    /// whatever is stored is a complete prefix of the chain.
    fn read(&self) -> RwLockReadGuard<'_, ChainState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// A consistent point-in-time view of the chain.
    fn snapshot(&self) -> Vec<Arc<LedgerEntry>> {
        self.read().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Hash of the last appended entry, or `GENESIS_HASH` when empty.
    pub fn head_hash(&self) -> String {
        self.read().tip_hash.clone()
    }

    pub fn get(&self, sequence: u64) -> Option<LedgerEntry> {
        let state = self.read();
        let idx = usize::try_from(sequence).ok()?;
        state.entries.get(idx).map(|e| LedgerEntry::clone(e))
    }

    /// Look up an entry by its stored hash.
    pub fn find_by_hash(&self, hash: &str) -> Option<LedgerEntry> {
        self.snapshot()
            .into_iter()
            .find(|e| e.hash == hash)
            .map(|e| LedgerEntry::clone(&e))
    }

    /// Copy of every entry, in order.
    pub fn export_entries(&self) -> Vec<LedgerEntry> {
        self.snapshot().iter().map(|e| LedgerEntry::clone(e)).collect()
    }

    /// Counts, time span, head hash and integrity status of the chain.
    pub fn summary(&self) -> LedgerSummary {
        let entries = self.snapshot();
        let report = verify_chain(&entries);
        let allow_count = entries
            .iter()
            .filter(|e| e.decision.outcome == Outcome::Allow)
            .count() as u64;

        LedgerSummary {
            total_entries: entries.len() as u64,
            allow_count,
            deny_count: entries.len() as u64 - allow_count,
            first_recorded_at: entries.first().map(|e| e.recorded_at),
            last_recorded_at: entries.last().map(|e| e.recorded_at),
            head_hash: report.head_hash,
            integrity_valid: report.valid,
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ── DecisionLedger impl ───────────────────────────────────────────────────────

impl DecisionLedger for InMemoryLedger {
    /// Append one decision to the hash chain.
    ///
    /// The payload is encoded before the lock is taken; sequence assignment,
    /// hashing against the current tip, the push, and the tip update all
    /// happen under the write lock.
    ///
    /// Returns `LedgerAppendFailed` if the decision was already recorded
    /// (carries a `ledger_sequence`), cannot be encoded, the lock is
    /// poisoned, or the stored length disagrees with the sequence counter.
    fn append(&self, decision: &Decision) -> LexeconResult<LedgerEntry> {
        if let Some(sequence) = decision.ledger_sequence {
            return Err(LexeconError::LedgerAppendFailed {
                reason: format!(
                    "decision {} is already recorded at sequence {}",
                    decision.decision_id, sequence
                ),
            });
        }

        let payload = canonical_payload(decision)?;

        let mut state = self.state.write().map_err(|e| LexeconError::LedgerAppendFailed {
            reason: format!("ledger state lock poisoned: {}", e),
        })?;

        if state.entries.len() as u64 != state.next_sequence {
            return Err(LexeconError::LedgerAppendFailed {
                reason: format!(
                    "ledger holds {} entries but next sequence is {}",
                    state.entries.len(),
                    state.next_sequence
                ),
            });
        }

        let sequence = state.next_sequence;
        let previous_hash = state.tip_hash.clone();
        let recorded_at = Utc::now();
        let hash = hash_entry(sequence, &recorded_at, &payload, &previous_hash);

        let entry = LedgerEntry {
            sequence,
            recorded_at,
            decision: decision.clone(),
            previous_hash,
            hash: hash.clone(),
        };

        state.entries.push(Arc::new(entry.clone()));
        state.next_sequence += 1;
        state.tip_hash = hash;
        drop(state);

        info!(
            sequence,
            decision_id = %entry.decision.decision_id,
            hash = %entry.hash,
            "ledger entry appended"
        );

        Ok(entry)
    }

    /// Entries in `start..=end`, clamped to the current tip.
    fn entries(&self, start: u64, end: u64) -> LexeconResult<Vec<LedgerEntry>> {
        if start > end {
            return Err(LexeconError::InvalidRange { start, end });
        }

        let state = self.read();
        let len = state.entries.len() as u64;
        if start >= len {
            return Ok(Vec::new());
        }
        let last = end.min(len - 1);

        debug!(start, end, returned = last - start + 1, "ledger range read");

        Ok(state.entries[start as usize..=last as usize]
            .iter()
            .map(|e| LedgerEntry::clone(e))
            .collect())
    }

    /// Verify the chain over a snapshot taken at call time.
    fn verify(&self) -> VerificationReport {
        let snapshot = self.snapshot();
        let report = verify_chain(&snapshot);
        debug!(
            valid = report.valid,
            entries_checked = report.entries_checked,
            "ledger verified"
        );
        report
    }
}
