//! Transitions: named, guarded edges between states
//!
//! A transition belongs to its FROM state and references its destination
//! by name only; the owning workflow resolves that name at traversal
//! time. Guard evaluation returns a [`TransitionVerdict`] value; nothing
//! is written back to the transition, so a shared definition graph can be
//! evaluated concurrently.

use serde::{Deserialize, Serialize};

use crate::activity::{ActivityRegistry, SubjectContext};
use crate::errors::WorkflowResult;
use crate::result::ActionResult;

// ── Verdict ──────────────────────────────────────────────────────────

/// Outcome of evaluating a transition's guard condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionVerdict {
    /// The transition may be taken
    Allowed,
    /// The transition is blocked; `reason` is set when the guard errored
    Denied { reason: Option<String> },
}

impl TransitionVerdict {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: Some(reason.into()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Denial reason, if one was captured
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied { reason } => reason.as_deref(),
        }
    }
}

// ── Transition ───────────────────────────────────────────────────────

/// A named edge from its owning state to `to_state_name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTransition {
    /// Name, unique within the owning state
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Destination state, referenced by name and resolved at traversal time
    pub to_state_name: String,
    /// Guard condition name, looked up in the activity registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Action name, looked up in the activity registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Prompt text a client may show when offering this transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    /// Client view hint associated with the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_prompt_view: Option<String>,
}

impl WorkflowTransition {
    /// Create a new transition to the named destination state
    pub fn new(name: impl Into<String>, to_state_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            to_state_name: to_state_name.into(),
            condition: None,
            action: None,
            user_prompt: None,
            user_prompt_view: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.user_prompt = Some(prompt.into());
        self
    }

    pub fn with_user_prompt_view(mut self, view: impl Into<String>) -> Self {
        self.user_prompt_view = Some(view.into());
        self
    }

    /// Evaluate this transition's guard condition.
    ///
    /// No configured condition means the transition is always allowed.
    /// A condition error (including an unregistered name) fails closed:
    /// the verdict is `Denied` with the error message as the reason.
    pub async fn evaluate_guard(
        &self,
        activities: &ActivityRegistry,
        ctx: &SubjectContext,
    ) -> TransitionVerdict {
        let condition_name = match &self.condition {
            Some(name) => name,
            None => return TransitionVerdict::Allowed,
        };

        let outcome = match activities.condition(condition_name) {
            Ok(condition) => condition.evaluate(ctx).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(true) => TransitionVerdict::Allowed,
            Ok(false) => TransitionVerdict::Denied { reason: None },
            Err(err) => {
                tracing::warn!(
                    transition = %self.name,
                    condition = %condition_name,
                    error = %err,
                    "Guard evaluation failed; denying transition"
                );
                TransitionVerdict::denied(err.to_string())
            }
        }
    }

    /// Execute this transition's action, succeeding immediately when none
    /// is configured.
    pub async fn execute_action(
        &self,
        activities: &ActivityRegistry,
        ctx: &SubjectContext,
    ) -> WorkflowResult<ActionResult> {
        match &self.action {
            Some(name) => activities.action(name)?.execute(ctx).await,
            None => Ok(ActionResult::success()),
        }
    }
}
