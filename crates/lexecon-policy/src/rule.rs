//! Policy rule types and configuration schema.
//!
//! A `PolicyConfig` is deserialized from TOML and holds the rules in
//! declaration order. The declaration index is the stable tie-breaker when
//! the graph orders rules that have no precedence edge between them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use lexecon_contracts::{
    context::{lookup, Context, ContextValue},
    request::DecisionRequest,
};

/// What an applicable rule does.
///
/// ```toml
/// effect = "permit"
/// effect = "deny"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleEffect {
    Permit,
    Deny,
}

/// The result of checking one rule against one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleVerdict {
    Permit,
    Deny,
    NotApplicable,
}

/// Comparison operator of a `Condition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOp {
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    Absent,
    GreaterThan,
    LessThan,
}

/// A predicate over one context value.
///
/// `key` is a dotted path into the request context. A missing key makes
/// every operator false except `absent`. Type mismatches are false, never an
/// error.
///
/// ```toml
/// conditions = [
///   { key = "purpose", op = "equals", value = "support_ticket" },
///   { key = "ticket.priority", op = "less-than", value = 3 },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub key: String,
    pub op: ConditionOp,
    #[serde(default)]
    pub value: Option<ContextValue>,
}

impl Condition {
    /// Return true if the condition holds for `context`.
    pub fn holds(&self, context: &Context) -> bool {
        let actual = lookup(context, &self.key);

        let (actual, expected) = match (self.op, actual, &self.value) {
            (ConditionOp::Absent, found, _) => return found.is_none(),
            (ConditionOp::Exists, found, _) => return found.is_some(),
            (_, Some(actual), Some(expected)) => (actual, expected),
            _ => return false,
        };

        match self.op {
            ConditionOp::Equals => actual.loosely_equals(expected),
            ConditionOp::NotEquals => !actual.loosely_equals(expected),
            ConditionOp::In => list_contains(expected, actual),
            ConditionOp::NotIn => !list_contains(expected, actual),
            ConditionOp::GreaterThan => actual.numeric_cmp(expected) == Some(Ordering::Greater),
            ConditionOp::LessThan => actual.numeric_cmp(expected) == Some(Ordering::Less),
            ConditionOp::Exists | ConditionOp::Absent => false,
        }
    }

    /// Structural check run at graph build time.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.key.trim().is_empty() {
            return Err("condition key must not be empty".to_string());
        }
        match (self.op, &self.value) {
            (ConditionOp::Exists | ConditionOp::Absent, Some(_)) => Err(format!(
                "condition on '{}' uses a presence operator and must not carry a value",
                self.key
            )),
            (ConditionOp::Exists | ConditionOp::Absent, None) => Ok(()),
            (ConditionOp::In | ConditionOp::NotIn, Some(ContextValue::List(_))) => Ok(()),
            (ConditionOp::In | ConditionOp::NotIn, _) => Err(format!(
                "condition on '{}' uses a membership operator and needs a list value",
                self.key
            )),
            (_, None) => Err(format!("condition on '{}' is missing its value", self.key)),
            (_, Some(value)) if !value.is_finite() => Err(format!(
                "condition on '{}' compares against a non-finite number",
                self.key
            )),
            (_, Some(_)) => Ok(()),
        }
    }
}

fn list_contains(list: &ContextValue, needle: &ContextValue) -> bool {
    match list {
        ContextValue::List(items) => items.iter().any(|item| item.loosely_equals(needle)),
        _ => false,
    }
}

/// A single policy rule loaded from TOML.
///
/// `actor` and `action` are patterns: `"*"` matches anything, a trailing
/// `*` (`"ai_agent:*"`) matches by prefix, anything else must match exactly
/// (case-sensitive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Stable identifier, used in decision reasons and ledger payloads.
    pub id: String,

    /// Human-readable explanation of what this rule controls.
    #[serde(default)]
    pub description: String,

    pub actor: String,

    pub action: String,

    pub effect: RuleEffect,

    /// All must hold for the rule to apply.
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Ids of rules whose outcome this rule overrides. This rule is
    /// evaluated ahead of every rule listed here.
    #[serde(default)]
    pub overrides: Vec<String>,

    /// Appended to the decision reason when this rule decides.
    #[serde(default)]
    pub justification: Option<String>,
}

impl PolicyRule {
    /// Return true if the actor and action patterns both match.
    pub fn matches(&self, actor: &str, action: &str) -> bool {
        pattern_matches(&self.actor, actor) && pattern_matches(&self.action, action)
    }

    /// Check this rule against `request`.
    pub fn evaluate(&self, request: &DecisionRequest) -> RuleVerdict {
        if !self.matches(&request.actor, &request.action) {
            return RuleVerdict::NotApplicable;
        }
        if !self.conditions.iter().all(|c| c.holds(&request.context)) {
            return RuleVerdict::NotApplicable;
        }
        match self.effect {
            RuleEffect::Permit => RuleVerdict::Permit,
            RuleEffect::Deny => RuleVerdict::Deny,
        }
    }

    /// The decision reason used when this rule decides.
    pub fn reason(&self) -> String {
        let head = match self.effect {
            RuleEffect::Permit => format!("permitted by rule '{}'", self.id),
            RuleEffect::Deny => format!("denied by rule '{}'", self.id),
        };
        match &self.justification {
            Some(text) if !text.trim().is_empty() => format!("{}: {}", head, text),
            _ => head,
        }
    }

    /// Structural check run at graph build time.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("rule id must not be empty".to_string());
        }
        if self.actor.trim().is_empty() {
            return Err(format!("rule '{}' has an empty actor pattern", self.id));
        }
        if self.action.trim().is_empty() {
            return Err(format!("rule '{}' has an empty action pattern", self.id));
        }
        for condition in &self.conditions {
            condition
                .check()
                .map_err(|reason| format!("rule '{}': {}", self.id, reason))?;
        }
        Ok(())
    }
}

fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => value.starts_with(prefix),
        None => pattern == value,
    }
}

/// The top-level structure deserialized from a TOML policy document.
///
/// ```toml
/// name = "customer-data"
///
/// [[rules]]
/// id = "support-access"
/// actor = "ai_agent:customer_service"
/// action = "access_customer_data"
/// effect = "permit"
/// conditions = [{ key = "purpose", op = "equals", value = "support_ticket" }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub name: Option<String>,

    /// Rules in declaration order.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}
