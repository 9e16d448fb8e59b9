//! Scenario 4: Tamper Detection
//!
//! Records a handful of decisions, exports the ledger the way an auditor
//! would receive it, then edits the exported copy in three different ways:
//!
//! Edit A — flip a recorded deny to allow      → hash mismatch at that entry
//! Edit B — splice out an entry                → sequence gap at the hole
//! Edit C — re-hash an edited entry in place   → linkage mismatch at the next entry
//!
//! The live ledger is untouched and keeps verifying.

use lexecon_contracts::{
    decision::Outcome,
    error::LexeconResult,
    ledger::{LedgerEntry, VerificationReport},
    request::DecisionRequest,
};
use lexecon_ledger::{recompute_hash, verify_chain};

use crate::runtime::{build_runtime, CUSTOMER_DATA_POLICY};

const PURPOSES: [&str; 5] = [
    "support_ticket",
    "marketing",
    "support_ticket",
    "advertising",
    "support_ticket",
];

/// Record one decision per entry of `PURPOSES` and return the exported chain.
pub fn recorded_chain() -> LexeconResult<Vec<LedgerEntry>> {
    let runtime = build_runtime(CUSTOMER_DATA_POLICY)?;
    for purpose in PURPOSES {
        runtime.pipeline.decide(
            DecisionRequest::new("ai_agent:customer_service", "access_customer_data")
                .with_context("purpose", purpose),
        )?;
    }
    Ok(runtime.ledger.export_entries())
}

/// Flip the outcome of entry `sequence`. Returns false, leaving `entries`
/// untouched, if there is no entry at that position.
pub fn flip_outcome(entries: &mut [LedgerEntry], sequence: usize) -> bool {
    let Some(entry) = entries.get_mut(sequence) else {
        return false;
    };
    entry.decision.outcome = match entry.decision.outcome {
        Outcome::Allow => Outcome::Deny,
        Outcome::Deny => Outcome::Allow,
    };
    true
}

/// Flip the outcome of entry `sequence` and recompute its hash so the entry
/// is self-consistent. The next entry's link still points at the old hash.
///
/// Returns `Ok(false)` if there is no entry at that position.
pub fn flip_and_rehash(entries: &mut [LedgerEntry], sequence: usize) -> LexeconResult<bool> {
    let Some(entry) = entries.get_mut(sequence) else {
        return Ok(false);
    };
    entry.decision.outcome = match entry.decision.outcome {
        Outcome::Allow => Outcome::Deny,
        Outcome::Deny => Outcome::Allow,
    };
    entry.hash = recompute_hash(entry)?;
    Ok(true)
}

fn describe(report: &VerificationReport) -> String {
    match report.first_failure {
        None => "VERIFIED".to_string(),
        Some(sequence) => format!(
            "FAILED at entry #{} ({:?})",
            sequence, report.failure_kind
        ),
    }
}

pub fn run_scenario() -> LexeconResult<()> {
    println!("=== Scenario 4: Tamper Detection ===");
    println!();

    let original = recorded_chain()?;
    println!("  Recorded {} decisions.", original.len());
    println!("  Exported copy:            {}", describe(&verify_chain(&original)));

    let mut edit_a = original.clone();
    flip_outcome(&mut edit_a, 1);
    println!("  Edit A (flip #1):         {}", describe(&verify_chain(&edit_a)));

    let mut edit_b = original.clone();
    edit_b.retain(|entry| entry.sequence != 2);
    println!("  Edit B (remove #2):       {}", describe(&verify_chain(&edit_b)));

    let mut edit_c = original.clone();
    flip_and_rehash(&mut edit_c, 3)?;
    println!("  Edit C (flip+rehash #3):  {}", describe(&verify_chain(&edit_c)));
    println!();

    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use lexecon_contracts::ledger::FailureKind;

    use super::*;

    #[test]
    fn untouched_export_verifies() {
        let chain = recorded_chain().unwrap();
        assert_eq!(chain.len(), PURPOSES.len());
        assert!(verify_chain(&chain).valid);
    }

    #[test]
    fn flipped_outcome_is_reported_at_its_sequence() {
        let mut chain = recorded_chain().unwrap();
        assert!(flip_outcome(&mut chain, 1));

        let report = verify_chain(&chain);
        assert!(!report.valid);
        assert_eq!(report.first_failure, Some(1));
        assert_eq!(report.failure_kind, FailureKind::HashMismatch);
    }

    #[test]
    fn removed_entry_is_a_sequence_gap() {
        let mut chain = recorded_chain().unwrap();
        chain.remove(2);

        let report = verify_chain(&chain);
        assert_eq!(report.first_failure, Some(2));
        assert_eq!(report.failure_kind, FailureKind::SequenceGap);
    }

    #[test]
    fn rehashed_edit_breaks_the_next_link() {
        let mut chain = recorded_chain().unwrap();
        assert!(flip_and_rehash(&mut chain, 3).unwrap());

        let report = verify_chain(&chain);
        assert_eq!(report.first_failure, Some(4));
        assert_eq!(report.failure_kind, FailureKind::LinkageMismatch);
    }

    #[test]
    fn edits_past_the_end_leave_the_chain_untouched() {
        let mut chain = recorded_chain().unwrap();
        let len = chain.len();

        assert!(!flip_outcome(&mut chain, len));
        assert!(!flip_and_rehash(&mut chain, len + 10).unwrap());
        assert_eq!(chain.len(), len);
        assert!(verify_chain(&chain).valid);
    }

    #[test]
    fn run_scenario_completes() {
        run_scenario().unwrap();
    }
}
