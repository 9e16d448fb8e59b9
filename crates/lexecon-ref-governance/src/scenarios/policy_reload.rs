//! Scenario 2: Policy Reload
//!
//! Step 1 — decide under revision 1: a support-ticket read of a record under
//!          legal hold is allowed (revision 1 has no legal-hold rule)
//! Step 2 — attempt to load a cyclic policy: rejected, revision 1 stays active
//! Step 3 — reload revision 2: the same request is now denied by `legal-hold`,
//!          which overrides `support-ticket-access`
//!
//! Every decision records the policy version that produced it, so the ledger
//! shows exactly when the policy changed.

use lexecon_contracts::{decision::Decision, error::LexeconResult, request::DecisionRequest};

use crate::runtime::{build_runtime, CUSTOMER_DATA_POLICY, CUSTOMER_DATA_POLICY_V2};

/// A policy whose two rules override each other.
pub const CYCLIC_POLICY: &str = r#"
[[rules]]
id = "a"
actor = "*"
action = "access_customer_data"
effect = "permit"
overrides = ["b"]

[[rules]]
id = "b"
actor = "*"
action = "access_customer_data"
effect = "deny"
overrides = ["a"]
"#;

fn held_record_request() -> DecisionRequest {
    DecisionRequest::new("ai_agent:customer_service", "access_customer_data")
        .with_context("purpose", "support_ticket")
        .with_context("legal_hold", true)
}

/// Decisions before and after the reload, plus whether the cyclic policy
/// was rejected.
pub struct ReloadOutcome {
    pub before: Decision,
    pub cyclic_rejected: bool,
    pub after: Decision,
}

pub fn execute() -> LexeconResult<ReloadOutcome> {
    let runtime = build_runtime(CUSTOMER_DATA_POLICY)?;

    let before = runtime.pipeline.decide(held_record_request())?;
    let cyclic_rejected = runtime.policy.reload_from_toml_str(CYCLIC_POLICY).is_err();
    runtime.policy.reload_from_toml_str(CUSTOMER_DATA_POLICY_V2)?;
    let after = runtime.pipeline.decide(held_record_request())?;

    Ok(ReloadOutcome {
        before,
        cyclic_rejected,
        after,
    })
}

pub fn run_scenario() -> LexeconResult<()> {
    println!("=== Scenario 2: Policy Reload ===");
    println!();

    let runtime = build_runtime(CUSTOMER_DATA_POLICY)?;

    println!("  Step 1: revision 1 active ({})", &runtime.policy.current().version()[..16]);
    let before = runtime.pipeline.decide(held_record_request())?;
    println!("    legal_hold = true, purpose = support_ticket → {}", before.outcome);
    println!("    Reason: {}", before.reason);
    println!();

    println!("  Step 2: loading a policy with a precedence cycle");
    match runtime.policy.reload_from_toml_str(CYCLIC_POLICY) {
        Ok(()) => println!("    Unexpectedly accepted: cycle detection failed"),
        Err(e) => println!("    Rejected: {}", e),
    }
    println!(
        "    Active version unchanged: {}",
        runtime.policy.current().version() == before.policy_version
    );
    println!();

    println!("  Step 3: reloading revision 2");
    runtime.policy.reload_from_toml_str(CUSTOMER_DATA_POLICY_V2)?;
    let graph = runtime.policy.current();
    println!(
        "    Evaluation order: {}",
        graph.evaluation_order().collect::<Vec<_>>().join(" → ")
    );
    let after = runtime.pipeline.decide(held_record_request())?;
    println!("    legal_hold = true, purpose = support_ticket → {}", after.outcome);
    println!("    Reason: {}", after.reason);
    println!();

    let report = runtime.pipeline.verify_ledger();
    println!(
        "  Ledger integrity: {}; entries record versions {}… and {}…",
        if report.valid { "VERIFIED" } else { "FAILED" },
        &before.policy_version[..16],
        &after.policy_version[..16]
    );
    println!();

    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}
