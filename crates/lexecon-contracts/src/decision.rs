//! Decision outcome types.
//!
//! A `Decision` is created by the policy evaluator, is immutable afterwards,
//! and is the payload of every ledger entry.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::DecisionRequest;

/// Unique, time-ordered identifier for a decision (UUIDv7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecisionId(pub uuid::Uuid);

impl DecisionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dec_{}", self.0.simple())
    }
}

/// Allow or deny. There is no third state: anything not explicitly
/// permitted is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Allow,
    Deny,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Allow => write!(f, "allow"),
            Outcome::Deny => write!(f, "deny"),
        }
    }
}

/// The result of evaluating one `DecisionRequest`.
///
/// Field order matters: the ledger hashes the compact JSON encoding of this
/// struct, and serde emits fields in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub decision_id: DecisionId,

    pub outcome: Outcome,

    /// Human-readable explanation derived from the deciding rule, or
    /// `"no matching policy"` for the fail-closed default.
    pub reason: String,

    /// The rule that decided, absent for the fail-closed default.
    pub rule_id: Option<String>,

    /// Version hash of the policy graph that produced this decision.
    pub policy_version: String,

    /// Wall-clock time the decision was made (UTC).
    pub timestamp: DateTime<Utc>,

    /// Echo of the originating request.
    pub request: DecisionRequest,

    /// Position in the ledger. Set only on the copy returned to the caller
    /// after the decision has been recorded; never part of the hashed payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_sequence: Option<u64>,
}

impl Decision {
    /// Stamp a fresh id and timestamp onto an evaluated verdict.
    pub fn new(
        request: DecisionRequest,
        outcome: Outcome,
        reason: impl Into<String>,
        rule_id: Option<String>,
        policy_version: impl Into<String>,
    ) -> Self {
        Self {
            decision_id: DecisionId::new(),
            outcome,
            reason: reason.into(),
            rule_id,
            policy_version: policy_version.into(),
            timestamp: Utc::now(),
            request,
            ledger_sequence: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.outcome == Outcome::Allow
    }
}
