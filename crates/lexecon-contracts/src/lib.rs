//! # lexecon-contracts
//!
//! Shared types and contracts for the Lexecon governance core.
//!
//! Every crate in the workspace imports from here. No business logic lives in
//! this crate, only data definitions, request validation, and error types.

pub mod context;
pub mod decision;
pub mod error;
pub mod ledger;
pub mod request;

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;
    use std::collections::BTreeMap;

    use super::*;
    use context::{lookup, Context, ContextValue};
    use decision::{Decision, DecisionId, Outcome};
    use error::LexeconError;
    use ledger::{FailureKind, LedgerEntry, VerificationReport};
    use request::DecisionRequest;

    // ── DecisionRequest validation ───────────────────────────────────────────

    #[test]
    fn request_with_actor_and_action_is_valid() {
        let req = DecisionRequest::new("ai_agent:customer_service", "access_customer_data");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_with_empty_actor_is_rejected() {
        let req = DecisionRequest::new("", "access_customer_data");
        match req.validate() {
            Err(LexeconError::InvalidRequest { reason }) => assert!(reason.contains("actor")),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn request_with_whitespace_action_is_rejected() {
        let req = DecisionRequest::new("ai_agent:support", "   ");
        match req.validate() {
            Err(LexeconError::InvalidRequest { reason }) => assert!(reason.contains("action")),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn request_with_nan_in_nested_context_is_rejected() {
        let mut nested = BTreeMap::new();
        nested.insert("score".to_string(), ContextValue::Float(f64::NAN));
        let req = DecisionRequest::new("a", "b").with_context("risk", ContextValue::Map(nested));

        match req.validate() {
            Err(LexeconError::InvalidRequest { reason }) => assert!(reason.contains("risk")),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    // ── ContextValue ─────────────────────────────────────────────────────────

    #[test]
    fn context_deserializes_from_plain_json() {
        let ctx: Context = serde_json::from_str(
            r#"{"purpose":"support_ticket","priority":2,"score":0.5,"vip":true,"tags":["a"],"ticket":{"id":7}}"#,
        )
        .unwrap();

        assert_eq!(ctx["purpose"], ContextValue::String("support_ticket".to_string()));
        assert_eq!(ctx["priority"], ContextValue::Integer(2));
        assert_eq!(ctx["score"], ContextValue::Float(0.5));
        assert_eq!(ctx["vip"], ContextValue::Bool(true));
        assert_eq!(ctx["tags"], ContextValue::List(vec!["a".into()]));
        assert!(matches!(ctx["ticket"], ContextValue::Map(_)));
    }

    #[test]
    fn context_serializes_with_sorted_keys() {
        let req = DecisionRequest::new("a", "b")
            .with_context("zeta", 1)
            .with_context("alpha", "x");
        let json = serde_json::to_string(&req.context).unwrap();
        assert_eq!(json, r#"{"alpha":"x","zeta":1}"#);
    }

    #[test]
    fn lookup_descends_dotted_paths() {
        let mut ticket = BTreeMap::new();
        ticket.insert("priority".to_string(), ContextValue::Integer(3));
        let req = DecisionRequest::new("a", "b")
            .with_context("ticket", ContextValue::Map(ticket))
            .with_context("purpose", "support");

        assert_eq!(lookup(&req.context, "ticket.priority"), Some(&ContextValue::Integer(3)));
        assert_eq!(lookup(&req.context, "purpose"), Some(&ContextValue::from("support")));
        assert_eq!(lookup(&req.context, "ticket.missing"), None);
        assert_eq!(lookup(&req.context, "purpose.deeper"), None);
    }

    #[test]
    fn loosely_equals_compares_numbers_across_variants() {
        assert!(ContextValue::Integer(2).loosely_equals(&ContextValue::Float(2.0)));
        assert!(!ContextValue::Integer(2).loosely_equals(&ContextValue::Float(2.5)));
        assert!(!ContextValue::from("2").loosely_equals(&ContextValue::Integer(2)));
    }

    #[test]
    fn numeric_comparison_is_exact_beyond_f64_precision() {
        const TWO_POW_53: i64 = 9_007_199_254_740_992;

        // Both sides round to the same f64, but they are different integers.
        assert_eq!(
            ContextValue::Integer(TWO_POW_53).numeric_cmp(&ContextValue::Integer(TWO_POW_53 + 1)),
            Some(Ordering::Less)
        );
        assert!(!ContextValue::Integer(TWO_POW_53 + 1).loosely_equals(&ContextValue::Float(TWO_POW_53 as f64)));
        assert!(ContextValue::Integer(TWO_POW_53).loosely_equals(&ContextValue::Float(TWO_POW_53 as f64)));
        assert_eq!(
            ContextValue::Float(TWO_POW_53 as f64).numeric_cmp(&ContextValue::Integer(TWO_POW_53 + 1)),
            Some(Ordering::Less)
        );

        assert_eq!(
            ContextValue::Integer(-3).numeric_cmp(&ContextValue::Float(-2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            ContextValue::Integer(i64::MAX).numeric_cmp(&ContextValue::Float(f64::INFINITY)),
            Some(Ordering::Less)
        );
        assert_eq!(ContextValue::Integer(1).numeric_cmp(&ContextValue::Float(f64::NAN)), None);
        assert_eq!(ContextValue::Integer(1).numeric_cmp(&ContextValue::from("1")), None);
    }

    // ── Decision ─────────────────────────────────────────────────────────────

    #[test]
    fn decision_ids_are_unique() {
        let ids: std::collections::HashSet<DecisionId> = (0..100).map(|_| DecisionId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn unrecorded_decision_omits_ledger_sequence() {
        let decision = Decision::new(
            DecisionRequest::new("a", "b"),
            Outcome::Deny,
            "no matching policy",
            None,
            "v1",
        );
        let json = serde_json::to_string(&decision).unwrap();
        assert!(!json.contains("ledger_sequence"));
        assert!(json.contains(r#""outcome":"deny""#));
    }

    #[test]
    fn recorded_decision_carries_entry_sequence() {
        let decision = Decision::new(DecisionRequest::new("a", "b"), Outcome::Allow, "ok", None, "v1");
        let entry = LedgerEntry {
            sequence: 4,
            recorded_at: decision.timestamp,
            decision: decision.clone(),
            previous_hash: LedgerEntry::GENESIS_HASH.to_string(),
            hash: "ab".repeat(32),
        };
        let recorded = entry.recorded_decision();
        assert_eq!(recorded.ledger_sequence, Some(4));
        assert_eq!(recorded.decision_id, decision.decision_id);
    }

    // ── VerificationReport ───────────────────────────────────────────────────

    #[test]
    fn failure_kind_uses_kebab_case() {
        let json = serde_json::to_string(&FailureKind::LinkageMismatch).unwrap();
        assert_eq!(json, r#""linkage-mismatch""#);
    }

    #[test]
    fn intact_report_has_no_failure() {
        let report = VerificationReport::intact(0, LedgerEntry::GENESIS_HASH);
        assert!(report.valid);
        assert_eq!(report.first_failure, None);
        assert_eq!(report.failure_kind, FailureKind::None);
    }

    // ── LexeconError ─────────────────────────────────────────────────────────

    #[test]
    fn error_invalid_range_display() {
        let err = LexeconError::InvalidRange { start: 5, end: 2 };
        let msg = err.to_string();
        assert!(msg.contains("invalid range"));
        assert!(msg.contains('5') && msg.contains('2'));
    }

    #[test]
    fn error_ledger_append_failed_display() {
        let err = LexeconError::LedgerAppendFailed {
            reason: "lock poisoned".to_string(),
        };
        assert!(err.to_string().contains("ledger append failed"));
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(LexeconError::InvalidRequest { reason: String::new() }.is_client_error());
        assert!(LexeconError::InvalidRange { start: 1, end: 0 }.is_client_error());
        assert!(!LexeconError::InvalidPolicyGraph { reason: String::new() }.is_client_error());
        assert!(!LexeconError::LedgerAppendFailed { reason: String::new() }.is_client_error());
        assert!(!LexeconError::ConfigError { reason: String::new() }.is_client_error());
    }
}
