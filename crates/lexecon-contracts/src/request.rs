//! The decision request submitted by an actor.

use serde::{Deserialize, Serialize};

use crate::{
    context::{Context, ContextValue},
    error::{LexeconError, LexeconResult},
};

/// "May `actor` perform `action` given `context`?"
///
/// Created per call and owned by the caller until handed to the evaluator.
/// Actor and action are free-form identifiers such as
/// `"ai_agent:customer_service"` and `"access_customer_data"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// Who is asking.
    pub actor: String,
    /// What they want to do.
    pub action: String,
    /// Additional facts the policy may condition on. May be empty.
    #[serde(default)]
    pub context: Context,
}

impl DecisionRequest {
    pub fn new(actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            action: action.into(),
            context: Context::new(),
        }
    }

    /// Builder-style helper for adding one context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Check the request shape.
    ///
    /// Returns `InvalidRequest` if the actor or action is empty (or only
    /// whitespace), or if any context value contains a non-finite float.
    pub fn validate(&self) -> LexeconResult<()> {
        if self.actor.trim().is_empty() {
            return Err(LexeconError::InvalidRequest {
                reason: "actor must be a non-empty identifier".to_string(),
            });
        }
        if self.action.trim().is_empty() {
            return Err(LexeconError::InvalidRequest {
                reason: "action must be a non-empty identifier".to_string(),
            });
        }
        if let Some((key, _)) = self.context.iter().find(|(_, value)| !value.is_finite()) {
            return Err(LexeconError::InvalidRequest {
                reason: format!("context value '{}' contains a non-finite number", key),
            });
        }
        Ok(())
    }
}
