//! Hash-chain primitives: canonical encoding, hashing, and verification.
//!
//! Hash input layout (bytes, in order):
//!   1. sequence as 8-byte little-endian
//!   2. recorded_at as RFC 3339 UTC with nanoseconds (`...T..:..:...nnnnnnnnnZ`)
//!   3. canonical payload: compact JSON of the decision (serde_json, fields
//!      in declaration order, context keys sorted, no ledger_sequence)
//!   4. previous_hash as UTF-8 bytes (64 ASCII hex chars)
//!
//! Note that `recorded_at` is part of the digest, so it cannot be rewritten
//! without breaking the entry. An external verifier hashing only
//! `sequence || payload || previous_hash` will not reproduce these hashes;
//! it must include the timestamp bytes in position 2 exactly as above.

use std::borrow::Borrow;

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use tracing::warn;

use lexecon_contracts::{
    decision::Decision,
    error::{LexeconError, LexeconResult},
    ledger::{FailureKind, LedgerEntry, VerificationReport},
};

/// Encode `decision` into the fixed byte form that is hashed.
///
/// Stable across runs and platforms: struct fields serialize in declaration
/// order, context maps are `BTreeMap`s, and floats use serde_json's shortest
/// round-trip formatting. Non-finite floats are rejected upstream by request
/// validation.
pub fn canonical_payload(decision: &Decision) -> LexeconResult<Vec<u8>> {
    serde_json::to_vec(decision).map_err(|e| LexeconError::LedgerAppendFailed {
        reason: format!("decision cannot be canonically encoded: {}", e),
    })
}

/// Compute the SHA-256 hash for one entry's fields.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_entry(
    sequence: u64,
    recorded_at: &DateTime<Utc>,
    payload: &[u8],
    previous_hash: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(recorded_at.to_rfc3339_opts(SecondsFormat::Nanos, true).as_bytes());
    hasher.update(payload);
    hasher.update(previous_hash.as_bytes());

    hex::encode(hasher.finalize())
}

/// Recompute the hash an entry should carry from its stored fields.
pub fn recompute_hash(entry: &LedgerEntry) -> LexeconResult<String> {
    let payload = canonical_payload(&entry.decision)?;
    Ok(hash_entry(
        entry.sequence,
        &entry.recorded_at,
        &payload,
        &entry.previous_hash,
    ))
}

/// Verify the integrity of a chain of entries.
///
/// For each entry at position `i`, in order:
///
/// 1. **Sequence** — `sequence == i` (no gaps, no duplicates).
/// 2. **Linkage** — `previous_hash` equals the stored hash of entry `i-1`,
///    or `GENESIS_HASH` for entry 0.
/// 3. **Hash** — the stored hash equals the hash recomputed from the entry.
///
/// Stops at the first violation and reports its position and kind. An empty
/// chain is valid.
pub fn verify_chain<E: Borrow<LedgerEntry>>(entries: &[E]) -> VerificationReport {
    let mut expected_prev = LedgerEntry::GENESIS_HASH;

    for (position, entry) in entries.iter().enumerate() {
        let entry = Borrow::<LedgerEntry>::borrow(entry);
        let position = position as u64;

        let failure = if entry.sequence != position {
            Some((
                FailureKind::SequenceGap,
                format!("expected sequence {}, found {}", position, entry.sequence),
            ))
        } else if entry.previous_hash != expected_prev {
            Some((
                FailureKind::LinkageMismatch,
                format!(
                    "previous_hash {} does not match preceding hash {}",
                    entry.previous_hash, expected_prev
                ),
            ))
        } else {
            match recompute_hash(entry) {
                Ok(recomputed) if recomputed == entry.hash => None,
                Ok(recomputed) => Some((
                    FailureKind::HashMismatch,
                    format!("stored hash {} but contents hash to {}", entry.hash, recomputed),
                )),
                Err(e) => Some((FailureKind::HashMismatch, e.to_string())),
            }
        };

        if let Some((kind, detail)) = failure {
            warn!(sequence = position, kind = ?kind, detail = %detail, "ledger integrity violation");
            return VerificationReport {
                valid: false,
                entries_checked: position + 1,
                first_failure: Some(position),
                failure_kind: kind,
                head_hash: head_hash(entries),
                detail: Some(detail),
            };
        }

        expected_prev = entry.hash.as_str();
    }

    VerificationReport::intact(entries.len() as u64, head_hash(entries))
}

fn head_hash<E: Borrow<LedgerEntry>>(entries: &[E]) -> String {
    entries
        .last()
        .map(|e| Borrow::<LedgerEntry>::borrow(e).hash.clone())
        .unwrap_or_else(|| LedgerEntry::GENESIS_HASH.to_string())
}
