//! Hot-reloadable policy engine.
//!
//! `PolicyEngine` owns the active `PolicyGraph` behind a swappable shared
//! reference. Evaluation clones the `Arc` and drops the lock before walking
//! the graph, so every in-flight evaluation finishes against exactly one
//! graph version while a reload installs the next one.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use lexecon_contracts::{
    decision::Decision,
    error::{LexeconError, LexeconResult},
    request::DecisionRequest,
};
use lexecon_core::traits::PolicyEvaluator;

use crate::{graph::PolicyGraph, rule::PolicyConfig};

/// Parse `s` as a TOML policy document and build its graph.
///
/// Malformed TOML is a `ConfigError`; a document that parses but fails the
/// graph checks is `InvalidPolicyGraph`.
pub fn parse_policy_toml(s: &str) -> LexeconResult<PolicyGraph> {
    let config: PolicyConfig = toml::from_str(s).map_err(|e| LexeconError::ConfigError {
        reason: format!("failed to parse policy TOML: {}", e),
    })?;
    PolicyGraph::build(config)
}

/// Read the file at `path` and build its policy graph.
pub fn load_policy_file(path: &Path) -> LexeconResult<PolicyGraph> {
    let contents = std::fs::read_to_string(path).map_err(|e| LexeconError::ConfigError {
        reason: format!("failed to read policy file '{}': {}", path.display(), e),
    })?;
    parse_policy_toml(&contents)
}

/// A `PolicyEvaluator` backed by a replaceable `PolicyGraph`.
///
/// ```rust,ignore
/// use lexecon_policy::PolicyEngine;
///
/// let engine = PolicyEngine::from_file(Path::new("policies/customer_data.toml"))?;
/// engine.reload_from_toml_str(&updated_policy)?;
/// ```
#[derive(Debug)]
pub struct PolicyEngine {
    graph: RwLock<Arc<PolicyGraph>>,
}

impl PolicyEngine {
    pub fn new(graph: PolicyGraph) -> Self {
        Self {
            graph: RwLock::new(Arc::new(graph)),
        }
    }

    pub fn from_toml_str(s: &str) -> LexeconResult<Self> {
        Ok(Self::new(parse_policy_toml(s)?))
    }

    pub fn from_file(path: &Path) -> LexeconResult<Self> {
        Ok(Self::new(load_policy_file(path)?))
    }

    /// The graph currently in effect.
    ///
    /// A poisoned lock is recovered: the guarded value is a single `Arc`
    /// that is either the old or the new graph, never a partial one.
    pub fn current(&self) -> Arc<PolicyGraph> {
        let guard = self.graph.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Install `graph` as the active policy.
    pub fn reload(&self, graph: PolicyGraph) {
        let incoming = Arc::new(graph);
        let previous = {
            let mut guard = self.graph.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, Arc::clone(&incoming))
        };

        info!(
            previous_version = %previous.version(),
            new_version = %incoming.version(),
            rule_count = incoming.len(),
            "policy graph reloaded"
        );
    }

    /// Parse and install a new policy. On error the active graph is kept.
    pub fn reload_from_toml_str(&self, s: &str) -> LexeconResult<()> {
        let graph = parse_policy_toml(s)?;
        self.reload(graph);
        Ok(())
    }

    /// Read, parse and install a new policy. On error the active graph is kept.
    pub fn reload_from_file(&self, path: &Path) -> LexeconResult<()> {
        let graph = load_policy_file(path)?;
        self.reload(graph);
        Ok(())
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(PolicyGraph::empty())
    }
}

impl PolicyEvaluator for PolicyEngine {
    fn evaluate(&self, request: &DecisionRequest) -> LexeconResult<Decision> {
        self.current().evaluate(request)
    }
}
