//! # lexecon-core
//!
//! The decision pipeline for the Lexecon governance core.
//!
//! This crate provides:
//! - The two trait seams (`PolicyEvaluator`, `DecisionLedger`)
//! - The `DecisionPipeline` that wires them together: validate, evaluate,
//!   record, return
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lexecon_core::DecisionPipeline;
//!
//! let pipeline = DecisionPipeline::new(Arc::new(policy_engine), Arc::new(ledger));
//! let decision = pipeline.decide(request)?;
//! assert_eq!(decision.ledger_sequence, Some(0));
//! ```

pub mod pipeline;
pub mod traits;

pub use pipeline::DecisionPipeline;
pub use traits::{DecisionLedger, PolicyEvaluator};
