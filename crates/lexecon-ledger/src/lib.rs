//! # lexecon-ledger
//!
//! Append-only, SHA-256 hash-chained decision ledger for the Lexecon
//! governance core.
//!
//! ## Overview
//!
//! Every recorded `Decision` is wrapped in a `LedgerEntry` that links to the
//! previous entry through its hash. Editing any stored entry, even a single
//! byte of its payload, breaks the chain, and `verify_chain` reports the
//! first entry where that happens.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lexecon_ledger::InMemoryLedger;
//! use lexecon_core::traits::DecisionLedger;
//!
//! let ledger = InMemoryLedger::new();
//! let entry = ledger.append(&decision)?;
//! assert_eq!(entry.sequence, 0);
//! assert!(ledger.verify().valid);
//! ```

pub mod chain;
pub mod memory;
pub mod summary;

pub use chain::{canonical_payload, hash_entry, recompute_hash, verify_chain};
pub use memory::InMemoryLedger;
pub use summary::LedgerSummary;

// ── Tests ─────────────────────────────────────────────────────────────────────
