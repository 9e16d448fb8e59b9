//! # lexecon-ref-governance
//!
//! Reference runtime for the Lexecon governance core.
//!
//! Wires the real components (policy engine, in-memory ledger, decision
//! pipeline) together with a bundled customer-data policy and runs four
//! scenarios:
//!
//! 1. **Customer Service** — an allowed support-ticket read and a
//!    fail-closed marketing request, both recorded and verified.
//! 2. **Policy Reload** — an atomic policy swap mid-run, including a rule
//!    that overrides an earlier one.
//! 3. **Concurrent Load** — many workers deciding at once; the ledger stays
//!    gap-free and verifiable.
//! 4. **Tamper Detection** — an edited copy of the ledger is caught at the
//!    exact entry that was changed.

pub mod runtime;
pub mod scenarios;

pub use runtime::{build_runtime, Runtime, CUSTOMER_DATA_POLICY, CUSTOMER_DATA_POLICY_V2};
