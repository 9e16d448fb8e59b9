//! Scenario 1: Customer Service Data Access
//!
//! Sub-case A — customer service agent, purpose = support_ticket → Allow (sequence 0)
//! Sub-case B — same agent, purpose = marketing                → Deny, "no matching policy" (sequence 1)
//!
//! Afterwards the ledger is verified and both entries are listed to show
//! the hash linkage.

use lexecon_contracts::{
    decision::Decision,
    error::LexeconResult,
    ledger::VerificationReport,
    request::DecisionRequest,
};

use crate::runtime::{build_runtime, CUSTOMER_DATA_POLICY};

pub const AGENT: &str = "ai_agent:customer_service";
pub const ACTION: &str = "access_customer_data";

/// Everything the scenario produced, for callers that want to inspect it.
pub struct CustomerServiceOutcome {
    pub support: Decision,
    pub marketing: Decision,
    pub report: VerificationReport,
}

/// Run both sub-cases against a fresh runtime.
pub fn execute() -> LexeconResult<CustomerServiceOutcome> {
    let runtime = build_runtime(CUSTOMER_DATA_POLICY)?;

    let support = runtime
        .pipeline
        .decide(DecisionRequest::new(AGENT, ACTION).with_context("purpose", "support_ticket"))?;
    let marketing = runtime
        .pipeline
        .decide(DecisionRequest::new(AGENT, ACTION).with_context("purpose", "marketing"))?;
    let report = runtime.pipeline.verify_ledger();

    Ok(CustomerServiceOutcome {
        support,
        marketing,
        report,
    })
}

pub fn run_scenario() -> LexeconResult<()> {
    println!("=== Scenario 1: Customer Service Data Access ===");
    println!();

    let runtime = build_runtime(CUSTOMER_DATA_POLICY)?;
    println!("  Policy version: {}", runtime.policy.current().version());
    println!();

    for (label, purpose) in [("A", "support_ticket"), ("B", "marketing")] {
        let decision = runtime
            .pipeline
            .decide(DecisionRequest::new(AGENT, ACTION).with_context("purpose", purpose))?;

        println!("  Sub-case {}: purpose = {}", label, purpose);
        println!("    Outcome:         {}", decision.outcome);
        println!("    Reason:          {}", decision.reason);
        println!("    Decision ID:     {}", decision.decision_id);
        println!(
            "    Ledger sequence: {}",
            decision
                .ledger_sequence
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        println!();
    }

    let report = runtime.pipeline.verify_ledger();
    println!(
        "  Ledger integrity: {} ({} entr{} checked)",
        if report.valid { "VERIFIED" } else { "FAILED" },
        report.entries_checked,
        if report.entries_checked == 1 { "y" } else { "ies" }
    );

    for entry in runtime.pipeline.list_ledger_entries(0, 1)? {
        println!(
            "    #{} prev={}… hash={}…",
            entry.sequence,
            &entry.previous_hash[..16],
            &entry.hash[..16]
        );
    }
    println!();

    println!("  Scenario 1 complete.");
    println!();
    Ok(())
}
