//! # lexecon-policy
//!
//! A TOML-driven, fail-closed policy graph for the Lexecon governance core.
//!
//! ## Overview
//!
//! Rules are declared in a TOML document. Each rule matches an actor and an
//! action pattern, may require context conditions, and may declare which
//! other rules it `overrides`. The document is compiled into an immutable
//! [`PolicyGraph`] whose evaluation order is a deterministic topological
//! order of those precedence edges. The first rule that applies decides; if
//! none applies, the request is denied.
//!
//! [`PolicyEngine`] implements
//! [`PolicyEvaluator`](lexecon_core::traits::PolicyEvaluator) and supports
//! atomic reloads.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use lexecon_policy::PolicyEngine;
//!
//! let engine = PolicyEngine::from_file(Path::new("policies/customer_data.toml"))?;
//! // Pass `Arc::new(engine)` to `lexecon_core::DecisionPipeline::new(...)`.
//! ```

pub mod engine;
pub mod graph;
pub mod rule;

pub use engine::{load_policy_file, parse_policy_toml, PolicyEngine};
pub use graph::{PolicyGraph, NO_MATCHING_POLICY};
pub use rule::{Condition, ConditionOp, PolicyConfig, PolicyRule, RuleEffect, RuleVerdict};

// ── Tests ─────────────────────────────────────────────────────────────────────
