//! Reference scenarios.
//!
//! Each scenario is a self-contained module that builds its own runtime and
//! narrates what the core does.

pub mod concurrent_load;
pub mod customer_service;
pub mod policy_reload;
pub mod tamper_detection;
