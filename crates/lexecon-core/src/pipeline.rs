//! The decision pipeline: the only entry point external collaborators use.
//!
//! Every call to `decide()` runs the same fixed sequence:
//!
//!   Validate → Evaluate → Append → Return
//!
//! The guarantee is structural: a `Decision` is only handed back after the
//! ledger has accepted it, so a caller can never observe a decision that is
//! not on record. Evaluation runs without locks; the ledger append is the
//! one serialization point.

use std::sync::Arc;

use tracing::{debug, info, warn};

use lexecon_contracts::{
    context::Context,
    decision::Decision,
    error::{LexeconError, LexeconResult},
    ledger::{LedgerEntry, VerificationReport},
    request::DecisionRequest,
};

use crate::traits::{DecisionLedger, PolicyEvaluator};

/// Couples a policy evaluator to a decision ledger.
///
/// Both components are injected as shared handles, so the caller can keep
/// its own reference (for policy reloads, or for direct ledger reads) and the
/// pipeline itself can be shared across worker threads.
pub struct DecisionPipeline {
    evaluator: Arc<dyn PolicyEvaluator>,
    ledger: Arc<dyn DecisionLedger>,
}

impl DecisionPipeline {
    pub fn new(evaluator: Arc<dyn PolicyEvaluator>, ledger: Arc<dyn DecisionLedger>) -> Self {
        Self { evaluator, ledger }
    }

    /// Evaluate `request` and record the resulting decision.
    ///
    /// # Pipeline
    ///
    /// 1. Validate the request shape; `InvalidRequest` stops here
    /// 2. Evaluate against the active policy; errors surface unchanged and
    ///    nothing is appended
    /// 3. Append the decision to the ledger; any failure surfaces as
    ///    `LedgerAppendFailed` and is not retried
    /// 4. Return the decision with `ledger_sequence` set
    pub fn decide(&self, request: DecisionRequest) -> LexeconResult<Decision> {
        // ── Step 1: Validate ─────────────────────────────────────────────────
        request.validate()?;

        debug!(
            actor = %request.actor,
            action = %request.action,
            context_keys = request.context.len(),
            "decision request received"
        );

        // ── Step 2: Evaluate ─────────────────────────────────────────────────
        let decision = self.evaluator.evaluate(&request)?;

        // ── Step 3: Record ───────────────────────────────────────────────────
        //
        // A retry here could record the same decision twice, so a failure is
        // final for this request.
        let entry = self.ledger.append(&decision).map_err(|e| {
            warn!(
                decision_id = %decision.decision_id,
                error = %e,
                "decision evaluated but could not be recorded"
            );
            match e {
                LexeconError::LedgerAppendFailed { .. } => e,
                other => LexeconError::LedgerAppendFailed {
                    reason: other.to_string(),
                },
            }
        })?;

        info!(
            decision_id = %decision.decision_id,
            outcome = %decision.outcome,
            sequence = entry.sequence,
            "decision recorded"
        );

        // ── Step 4: Return ───────────────────────────────────────────────────
        Ok(Decision {
            ledger_sequence: Some(entry.sequence),
            ..decision
        })
    }

    /// Convenience form of `decide()` taking the request parts directly.
    pub fn decide_with(
        &self,
        actor: impl Into<String>,
        action: impl Into<String>,
        context: Context,
    ) -> LexeconResult<Decision> {
        self.decide(DecisionRequest {
            actor: actor.into(),
            action: action.into(),
            context,
        })
    }

    /// Ledger entries with sequence numbers in `start..=end`.
    pub fn list_ledger_entries(&self, start: u64, end: u64) -> LexeconResult<Vec<LedgerEntry>> {
        self.ledger.entries(start, end)
    }

    /// Verify the full ledger chain.
    pub fn verify_ledger(&self) -> VerificationReport {
        let report = self.ledger.verify();
        if !report.valid {
            warn!(
                first_failure = ?report.first_failure,
                kind = ?report.failure_kind,
                "ledger verification failed"
            );
        }
        report
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use lexecon_contracts::{
        decision::{Decision, Outcome},
        error::{LexeconError, LexeconResult},
        ledger::{FailureKind, LedgerEntry, VerificationReport},
        request::DecisionRequest,
    };

    use crate::traits::{DecisionLedger, PolicyEvaluator};

    use super::DecisionPipeline;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// An evaluator that returns a fixed outcome and counts its calls.
    struct MockEvaluator {
        outcome: Outcome,
        calls: Arc<Mutex<u32>>,
    }

    impl MockEvaluator {
        fn new(outcome: Outcome) -> Self {
            Self {
                outcome,
                calls: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl PolicyEvaluator for MockEvaluator {
        fn evaluate(&self, request: &DecisionRequest) -> LexeconResult<Decision> {
            *self.calls.lock().unwrap() += 1;
            Ok(Decision::new(
                request.clone(),
                self.outcome,
                "mock verdict",
                Some("mock-rule".to_string()),
                "mock-version",
            ))
        }
    }

    /// An evaluator that always fails with `InvalidRequest`.
    struct RejectingEvaluator;

    impl PolicyEvaluator for RejectingEvaluator {
        fn evaluate(&self, _request: &DecisionRequest) -> LexeconResult<Decision> {
            Err(LexeconError::InvalidRequest {
                reason: "rejected by mock".to_string(),
            })
        }
    }

    /// A ledger that records appended decisions without hashing.
    struct MockLedger {
        appended: Arc<Mutex<Vec<Decision>>>,
    }

    impl MockLedger {
        fn new() -> Self {
            Self {
                appended: Arc::new(Mutex::new(vec![])),
            }
        }
    }

    impl DecisionLedger for MockLedger {
        fn append(&self, decision: &Decision) -> LexeconResult<LedgerEntry> {
            let mut appended = self.appended.lock().unwrap();
            let sequence = appended.len() as u64;
            appended.push(decision.clone());
            Ok(LedgerEntry {
                sequence,
                recorded_at: Utc::now(),
                decision: decision.clone(),
                previous_hash: LedgerEntry::GENESIS_HASH.to_string(),
                hash: "mock".to_string(),
            })
        }

        fn entries(&self, start: u64, end: u64) -> LexeconResult<Vec<LedgerEntry>> {
            if start > end {
                return Err(LexeconError::InvalidRange { start, end });
            }
            Ok(vec![])
        }

        fn verify(&self) -> VerificationReport {
            VerificationReport::intact(self.appended.lock().unwrap().len() as u64, "mock")
        }
    }

    /// A ledger whose append fails with the configured error.
    struct FailingLedger {
        error: fn() -> LexeconError,
    }

    impl DecisionLedger for FailingLedger {
        fn append(&self, _decision: &Decision) -> LexeconResult<LedgerEntry> {
            Err((self.error)())
        }

        fn entries(&self, _start: u64, _end: u64) -> LexeconResult<Vec<LedgerEntry>> {
            Ok(vec![])
        }

        fn verify(&self) -> VerificationReport {
            VerificationReport {
                valid: false,
                entries_checked: 1,
                first_failure: Some(0),
                failure_kind: FailureKind::HashMismatch,
                head_hash: "broken".to_string(),
                detail: Some("mock corruption".to_string()),
            }
        }
    }

    fn request() -> DecisionRequest {
        DecisionRequest::new("ai_agent:customer_service", "access_customer_data")
            .with_context("purpose", "support_ticket")
    }

    // ── Test cases ───────────────────────────────────────────────────────────

    /// A successful decision is appended and comes back with its sequence.
    #[test]
    fn test_decide_records_and_returns_sequence() {
        let ledger = MockLedger::new();
        let appended = ledger.appended.clone();
        let pipeline = DecisionPipeline::new(
            Arc::new(MockEvaluator::new(Outcome::Allow)),
            Arc::new(ledger),
        );

        let first = pipeline.decide(request()).unwrap();
        let second = pipeline.decide(request()).unwrap();

        assert_eq!(first.outcome, Outcome::Allow);
        assert_eq!(first.ledger_sequence, Some(0));
        assert_eq!(second.ledger_sequence, Some(1));

        let appended = appended.lock().unwrap();
        assert_eq!(appended.len(), 2);
        // The ledger receives the unrecorded decision.
        assert_eq!(appended[0].ledger_sequence, None);
        assert_eq!(appended[0].decision_id, first.decision_id);
    }

    /// A malformed request never reaches the evaluator or the ledger.
    #[test]
    fn test_invalid_request_skips_evaluation_and_append() {
        let evaluator = MockEvaluator::new(Outcome::Allow);
        let calls = evaluator.calls.clone();
        let ledger = MockLedger::new();
        let appended = ledger.appended.clone();
        let pipeline = DecisionPipeline::new(Arc::new(evaluator), Arc::new(ledger));

        let result = pipeline.decide(DecisionRequest::new("", "access_customer_data"));

        assert!(matches!(result, Err(LexeconError::InvalidRequest { .. })));
        assert_eq!(*calls.lock().unwrap(), 0, "evaluate() must not run on invalid input");
        assert!(appended.lock().unwrap().is_empty(), "nothing may be appended");
    }

    /// Evaluation errors surface unchanged and nothing is appended.
    #[test]
    fn test_evaluation_error_surfaces_unchanged() {
        let ledger = MockLedger::new();
        let appended = ledger.appended.clone();
        let pipeline = DecisionPipeline::new(Arc::new(RejectingEvaluator), Arc::new(ledger));

        match pipeline.decide(request()) {
            Err(LexeconError::InvalidRequest { reason }) => {
                assert_eq!(reason, "rejected by mock");
            }
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
        assert!(appended.lock().unwrap().is_empty());
    }

    /// An append failure surfaces as LedgerAppendFailed, never as success.
    #[test]
    fn test_append_failure_is_surfaced() {
        let pipeline = DecisionPipeline::new(
            Arc::new(MockEvaluator::new(Outcome::Deny)),
            Arc::new(FailingLedger {
                error: || LexeconError::LedgerAppendFailed {
                    reason: "writer invariant broken".to_string(),
                },
            }),
        );

        match pipeline.decide(request()) {
            Err(LexeconError::LedgerAppendFailed { reason }) => {
                assert!(reason.contains("writer invariant broken"));
            }
            other => panic!("expected LedgerAppendFailed, got {:?}", other),
        }
    }

    /// Any other error kind from the ledger is wrapped into LedgerAppendFailed.
    #[test]
    fn test_foreign_append_error_is_wrapped() {
        let pipeline = DecisionPipeline::new(
            Arc::new(MockEvaluator::new(Outcome::Allow)),
            Arc::new(FailingLedger {
                error: || LexeconError::ConfigError {
                    reason: "backend unavailable".to_string(),
                },
            }),
        );

        match pipeline.decide(request()) {
            Err(LexeconError::LedgerAppendFailed { reason }) => {
                assert!(reason.contains("backend unavailable"));
            }
            other => panic!("expected LedgerAppendFailed, got {:?}", other),
        }
    }

    /// decide_with() builds the same request as decide().
    #[test]
    fn test_decide_with_echoes_parts() {
        let pipeline = DecisionPipeline::new(
            Arc::new(MockEvaluator::new(Outcome::Deny)),
            Arc::new(MockLedger::new()),
        );

        let decision = pipeline
            .decide_with("ai_agent:marketing", "send_email", Default::default())
            .unwrap();

        assert_eq!(decision.request.actor, "ai_agent:marketing");
        assert_eq!(decision.request.action, "send_email");
        assert!(decision.request.context.is_empty());
    }

    /// Read operations delegate to the ledger.
    #[test]
    fn test_ledger_reads_delegate() {
        let pipeline = DecisionPipeline::new(
            Arc::new(MockEvaluator::new(Outcome::Allow)),
            Arc::new(MockLedger::new()),
        );

        assert!(matches!(
            pipeline.list_ledger_entries(3, 1),
            Err(LexeconError::InvalidRange { start: 3, end: 1 })
        ));
        assert!(pipeline.verify_ledger().valid);
    }

    /// A failed verification is returned as a report, not an error.
    #[test]
    fn test_failed_verification_is_a_report() {
        let pipeline = DecisionPipeline::new(
            Arc::new(MockEvaluator::new(Outcome::Allow)),
            Arc::new(FailingLedger {
                error: || LexeconError::LedgerAppendFailed { reason: String::new() },
            }),
        );

        let report = pipeline.verify_ledger();
        assert!(!report.valid);
        assert_eq!(report.first_failure, Some(0));
        assert_eq!(report.failure_kind, FailureKind::HashMismatch);
    }
}
