//! Core trait definitions for the Lexecon decision pipeline.
//!
//! Two traits define the trust boundary:
//!
//! - `PolicyEvaluator` — pure, deterministic gate that turns a request into
//!   a `Decision`
//! - `DecisionLedger`  — append-only, tamper-evident record of every decision
//!
//! The pipeline wires them together in a fixed order. Implementations are
//! injected so a persistent ledger can replace the in-memory one without
//! touching the pipeline.

use lexecon_contracts::{
    decision::Decision,
    error::LexeconResult,
    ledger::{LedgerEntry, VerificationReport},
    request::DecisionRequest,
};

/// The policy evaluator.
///
/// Implementations must be deterministic and side-effect free: the same
/// request against the same policy always yields the same outcome, reason
/// and rule, on any thread. No blocking I/O on this path.
pub trait PolicyEvaluator: Send + Sync {
    /// Evaluate `request` and produce a fresh, unrecorded `Decision`.
    ///
    /// Returns `InvalidRequest` for a malformed request. Never returns
    /// `InvalidPolicyGraph`; graph errors surface when the policy is loaded.
    fn evaluate(&self, request: &DecisionRequest) -> LexeconResult<Decision>;
}

/// The decision ledger: the single serialization point of the core.
///
/// Appends are mutually exclusive. Reads observe a consistent snapshot and
/// may run concurrently with appends.
pub trait DecisionLedger: Send + Sync {
    /// Record `decision` as the next entry in the chain.
    ///
    /// Returns `LedgerAppendFailed` if the entry cannot be recorded. Entries
    /// are never modified or removed once appended.
    fn append(&self, decision: &Decision) -> LexeconResult<LedgerEntry>;

    /// Entries with sequence numbers in `start..=end`, in order.
    ///
    /// Bounds past the tip are clamped; `start > end` is `InvalidRange`.
    fn entries(&self, start: u64, end: u64) -> LexeconResult<Vec<LedgerEntry>>;

    /// Re-walk the chain and report the first integrity violation, if any.
    fn verify(&self) -> VerificationReport;
}
