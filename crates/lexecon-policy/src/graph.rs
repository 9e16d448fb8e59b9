//! The immutable policy graph.
//!
//! A `PolicyGraph` is built once from a `PolicyConfig` and never mutated.
//! Building it runs every structural check and fixes the evaluation order:
//!
//! 1. Each `overrides` entry adds an edge "this rule before that rule".
//! 2. Rules are ordered topologically (Kahn's algorithm). Among rules that
//!    are ready at the same time, the lowest declaration index goes first,
//!    so the order never depends on hash-map iteration.
//! 3. If any rule is left unordered, the edges contain a cycle and the
//!    build fails with `InvalidPolicyGraph`.
//!
//! Evaluation walks the ordered rules; the first rule that applies decides.
//! If none applies the request is denied (fail-closed).

use std::collections::{BTreeSet, HashMap};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use lexecon_contracts::{
    decision::{Decision, Outcome},
    error::{LexeconError, LexeconResult},
    request::DecisionRequest,
};

use crate::rule::{PolicyConfig, PolicyRule, RuleVerdict};

/// Reason recorded when no rule applies.
pub const NO_MATCHING_POLICY: &str = "no matching policy";

/// A validated, topologically ordered set of policy rules.
#[derive(Debug, Clone)]
pub struct PolicyGraph {
    name: Option<String>,
    version: String,
    /// Rules in evaluation order.
    rules: Vec<PolicyRule>,
}

impl PolicyGraph {
    /// Validate `config` and fix its evaluation order.
    ///
    /// Returns `InvalidPolicyGraph` for an empty or duplicate rule id, an
    /// empty actor/action pattern, a malformed condition, an `overrides`
    /// entry that names an unknown rule or the rule itself, or a precedence
    /// cycle.
    pub fn build(config: PolicyConfig) -> LexeconResult<Self> {
        let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(config.rules.len());
        for (idx, rule) in config.rules.iter().enumerate() {
            rule.check().map_err(invalid)?;
            if index_of.insert(rule.id.as_str(), idx).is_some() {
                return Err(invalid(format!("duplicate rule id '{}'", rule.id)));
            }
        }

        // successors[i] holds every rule that must come after rule i.
        let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); config.rules.len()];
        for (idx, rule) in config.rules.iter().enumerate() {
            for target in &rule.overrides {
                let target_idx = *index_of.get(target.as_str()).ok_or_else(|| {
                    invalid(format!(
                        "rule '{}' overrides unknown rule '{}'",
                        rule.id, target
                    ))
                })?;
                if target_idx == idx {
                    return Err(invalid(format!("rule '{}' overrides itself", rule.id)));
                }
                successors[idx].insert(target_idx);
            }
        }

        let version = policy_version(&config)?;

        let order = topological_order(&successors).map_err(|stuck| {
            let names: Vec<&str> = stuck.iter().map(|&i| config.rules[i].id.as_str()).collect();
            invalid(format!(
                "precedence cycle; rules that cannot be ordered: {}",
                names.join(", ")
            ))
        })?;

        let mut slots: Vec<Option<PolicyRule>> = config.rules.into_iter().map(Some).collect();
        let rules = order
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect::<Vec<_>>();

        debug!(
            policy = config.name.as_deref().unwrap_or("unnamed"),
            version = %version,
            rule_count = rules.len(),
            "policy graph built"
        );

        Ok(Self {
            name: config.name,
            version,
            rules,
        })
    }

    /// A graph with no rules. Every request is denied.
    pub fn empty() -> Self {
        Self::build(PolicyConfig::default()).unwrap_or_else(|_| Self {
            name: None,
            version: String::new(),
            rules: Vec::new(),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// SHA-256 (hex) of the canonical JSON of the loaded configuration.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule ids in the order they are evaluated.
    pub fn evaluation_order(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.id.as_str())
    }

    /// Evaluate `request` against this graph.
    ///
    /// Pure: reads the graph, touches no shared state, performs no I/O.
    pub fn evaluate(&self, request: &DecisionRequest) -> LexeconResult<Decision> {
        request.validate()?;

        for rule in &self.rules {
            let outcome = match rule.evaluate(request) {
                RuleVerdict::NotApplicable => continue,
                RuleVerdict::Permit => Outcome::Allow,
                RuleVerdict::Deny => Outcome::Deny,
            };

            debug!(
                rule_id = %rule.id,
                actor = %request.actor,
                action = %request.action,
                outcome = %outcome,
                "rule decided"
            );

            return Ok(Decision::new(
                request.clone(),
                outcome,
                rule.reason(),
                Some(rule.id.clone()),
                self.version.clone(),
            ));
        }

        warn!(
            actor = %request.actor,
            action = %request.action,
            "no policy rule applied; denying by default"
        );

        Ok(Decision::new(
            request.clone(),
            Outcome::Deny,
            NO_MATCHING_POLICY,
            None,
            self.version.clone(),
        ))
    }
}

fn invalid(reason: impl Into<String>) -> LexeconError {
    LexeconError::InvalidPolicyGraph {
        reason: reason.into(),
    }
}

/// Kahn's algorithm with lowest-index-first tie breaking.
///
/// On a cycle, returns the indices that could not be ordered.
fn topological_order(successors: &[BTreeSet<usize>]) -> Result<Vec<usize>, Vec<usize>> {
    let mut in_degree = vec![0usize; successors.len()];
    for targets in successors {
        for &t in targets {
            in_degree[t] += 1;
        }
    }

    let mut ready: BTreeSet<usize> = (0..successors.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(successors.len());

    while let Some(idx) = ready.pop_first() {
        order.push(idx);
        for &t in &successors[idx] {
            in_degree[t] -= 1;
            if in_degree[t] == 0 {
                ready.insert(t);
            }
        }
    }

    if order.len() == successors.len() {
        Ok(order)
    } else {
        Err((0..successors.len()).filter(|&i| in_degree[i] > 0).collect())
    }
}

fn policy_version(config: &PolicyConfig) -> LexeconResult<String> {
    let canonical = serde_json::to_vec(config)
        .map_err(|e| invalid(format!("policy cannot be canonicalized: {}", e)))?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}
