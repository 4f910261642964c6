//! Conditions, actions, and the registry that names them
//!
//! Workflow definitions reference guard conditions and actions by NAME.
//! The host registers implementations under those names in an
//! [`ActivityRegistry`] and the engine resolves them at each step. Both
//! traits are async: activities are expected to perform I/O.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{WorkflowError, WorkflowResult};
use crate::result::ActionResult;

// ── Subject context ──────────────────────────────────────────────────

/// Snapshot of a subject handed to conditions and actions.
///
/// Hosts put whatever their activities need into `payload`; the engine
/// never inspects it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_state: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl SubjectContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ── Activity traits ──────────────────────────────────────────────────

/// Boolean guard evaluated before a transition may proceed.
///
/// An `Err` from `evaluate` is treated by the engine as a denial
/// (fails closed), with the error message as the denial reason.
#[async_trait]
pub trait Condition: Send + Sync {
    async fn evaluate(&self, ctx: &SubjectContext) -> WorkflowResult<bool>;
}

/// Side-effecting operation run when entering/exiting a state or taking
/// a transition.
///
/// A non-success [`ActionResult`] stops the transition pipeline; an `Err`
/// is an unexpected failure and surfaces as an error-coded result.
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(&self, ctx: &SubjectContext) -> WorkflowResult<ActionResult>;
}

// ── Registry ─────────────────────────────────────────────────────────

/// Name → implementation maps for conditions and actions.
#[derive(Clone, Default)]
pub struct ActivityRegistry {
    conditions: HashMap<String, Arc<dyn Condition>>,
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActivityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a condition under `name`, replacing any previous entry.
    pub fn register_condition(&mut self, name: impl Into<String>, condition: Arc<dyn Condition>) {
        let name = name.into();
        tracing::debug!(condition = %name, "Condition registered");
        self.conditions.insert(name, condition);
    }

    /// Register an action under `name`, replacing any previous entry.
    pub fn register_action(&mut self, name: impl Into<String>, action: Arc<dyn Action>) {
        let name = name.into();
        tracing::debug!(action = %name, "Action registered");
        self.actions.insert(name, action);
    }

    /// Look up a condition by name
    pub fn condition(&self, name: &str) -> WorkflowResult<Arc<dyn Condition>> {
        self.conditions
            .get(name)
            .cloned()
            .ok_or_else(|| WorkflowError::ConditionNotRegistered(name.to_string()))
    }

    /// Look up an action by name
    pub fn action(&self, name: &str) -> WorkflowResult<Arc<dyn Action>> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| WorkflowError::ActionNotRegistered(name.to_string()))
    }

    pub fn condition_names(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for ActivityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityRegistry")
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
