//! Bundled policies and the runtime wiring shared by every scenario.

use std::sync::Arc;

use lexecon_contracts::error::LexeconResult;
use lexecon_core::DecisionPipeline;
use lexecon_ledger::InMemoryLedger;
use lexecon_policy::PolicyEngine;

/// The customer-data policy used by the scenarios.
pub const CUSTOMER_DATA_POLICY: &str = include_str!("../policies/customer_data.toml");

/// Revision 2 of the policy: adds a legal hold and a marketing embargo.
pub const CUSTOMER_DATA_POLICY_V2: &str = include_str!("../policies/customer_data_v2.toml");

/// One governance core instance.
///
/// The engine and ledger handles are kept alongside the pipeline so callers
/// can reload policy or read the ledger directly.
pub struct Runtime {
    pub policy: Arc<PolicyEngine>,
    pub ledger: Arc<InMemoryLedger>,
    pub pipeline: DecisionPipeline,
}

/// Load `policy_toml`, create an empty ledger, and wire the pipeline.
pub fn build_runtime(policy_toml: &str) -> LexeconResult<Runtime> {
    let policy = Arc::new(PolicyEngine::from_toml_str(policy_toml)?);
    let ledger = Arc::new(InMemoryLedger::new());
    let pipeline = DecisionPipeline::new(policy.clone(), ledger.clone());

    Ok(Runtime {
        policy,
        ledger,
        pipeline,
    })
}
