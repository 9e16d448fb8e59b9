//! Scenario 3: Concurrent Load
//!
//! Several worker threads share one pipeline and submit a mix of allowed and
//! denied requests at the same time. Evaluation runs in parallel; the ledger
//! append is the only point where workers serialize. Afterwards the ledger
//! must hold exactly one entry per decision, numbered 0..n-1 with no gaps,
//! and the chain must verify.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::debug;

use lexecon_contracts::{
    decision::{Decision, Outcome},
    error::LexeconResult,
    request::DecisionRequest,
};
use lexecon_core::DecisionPipeline;

use crate::runtime::{build_runtime, CUSTOMER_DATA_POLICY};

pub const WORKERS: usize = 8;
pub const REQUESTS_PER_WORKER: usize = 250;

fn request_for(worker: usize, i: usize) -> DecisionRequest {
    let purpose = if (worker + i) % 3 == 0 { "marketing" } else { "support_ticket" };
    DecisionRequest::new("ai_agent:customer_service", "access_customer_data")
        .with_context("purpose", purpose)
        .with_context("worker", worker as i64)
        .with_context("ticket", i as i64)
}

/// Submit `workers * per_worker` requests from `workers` threads at once.
///
/// Returns every decision; the first error from any worker aborts that
/// worker and is returned.
pub fn run_load(
    pipeline: &DecisionPipeline,
    workers: usize,
    per_worker: usize,
) -> LexeconResult<Vec<Decision>> {
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                s.spawn(move || {
                    (0..per_worker)
                        .map(|i| pipeline.decide(request_for(worker, i)))
                        .collect::<LexeconResult<Vec<_>>>()
                })
            })
            .collect();

        let mut decisions = Vec::with_capacity(workers * per_worker);
        for handle in handles {
            // A panicking worker is a bug in the core; re-raise it here.
            let batch = match handle.join() {
                Ok(batch) => batch?,
                Err(panic) => std::panic::resume_unwind(panic),
            };
            decisions.extend(batch);
        }
        debug!(decisions = decisions.len(), "load run finished");
        Ok(decisions)
    })
}

/// True if the decisions' ledger sequences are exactly `0..decisions.len()`.
pub fn sequences_are_gap_free(decisions: &[Decision]) -> bool {
    let sequences: BTreeSet<u64> = decisions.iter().filter_map(|d| d.ledger_sequence).collect();
    sequences.len() == decisions.len()
        && sequences
            .iter()
            .enumerate()
            .all(|(expected, &actual)| expected as u64 == actual)
}

pub fn run_scenario() -> LexeconResult<()> {
    println!("=== Scenario 3: Concurrent Load ===");
    println!();

    let runtime = build_runtime(CUSTOMER_DATA_POLICY)?;

    let started = Instant::now();
    let decisions = run_load(&runtime.pipeline, WORKERS, REQUESTS_PER_WORKER)?;
    let elapsed = started.elapsed();

    let allowed = decisions.iter().filter(|d| d.outcome == Outcome::Allow).count();
    println!("  Workers:          {}", WORKERS);
    println!("  Decisions:        {} ({} allow, {} deny)", decisions.len(), allowed, decisions.len() - allowed);
    println!("  Wall time:        {:.2?}", elapsed);
    println!("  Ledger entries:   {}", runtime.ledger.len());
    println!("  Gap-free 0..n-1:  {}", sequences_are_gap_free(&decisions));

    let report = runtime.pipeline.verify_ledger();
    println!(
        "  Ledger integrity: {} (head {}…)",
        if report.valid { "VERIFIED" } else { "FAILED" },
        &report.head_hash[..16]
    );
    println!();

    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_decisions_are_all_recorded_without_gaps() {
        let runtime = build_runtime(CUSTOMER_DATA_POLICY).unwrap();
        let decisions = run_load(&runtime.pipeline, 6, 40).unwrap();

        assert_eq!(decisions.len(), 240);
        assert_eq!(runtime.ledger.len(), 240);
        assert!(sequences_are_gap_free(&decisions));

        let report = runtime.pipeline.verify_ledger();
        assert!(report.valid);
        assert_eq!(report.entries_checked, 240);
    }

    #[test]
    fn each_recorded_entry_matches_its_decision() {
        let runtime = build_runtime(CUSTOMER_DATA_POLICY).unwrap();
        let decisions = run_load(&runtime.pipeline, 4, 25).unwrap();

        for decision in &decisions {
            let sequence = decision.ledger_sequence.unwrap();
            let entry = runtime.ledger.get(sequence).unwrap();
            assert_eq!(entry.decision.decision_id, decision.decision_id);
            assert_eq!(entry.decision.outcome, decision.outcome);
        }
    }

    #[test]
    fn gap_detection_helper() {
        let runtime = build_runtime(CUSTOMER_DATA_POLICY).unwrap();
        let mut decisions = run_load(&runtime.pipeline, 2, 3).unwrap();
        assert!(sequences_are_gap_free(&decisions));

        decisions.retain(|d| d.ledger_sequence != Some(0));
        assert!(!sequences_are_gap_free(&decisions));
    }
}
