//! Transition introspection for hosts and UIs
//!
//! Descriptors flatten a transition plus its guard verdict into a plain
//! serializable record, so a host can render "what can happen next"
//! without touching engine types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trellis_engine::{SubjectContext, TransitionVerdict, WorkflowTransition};

/// A transition viewed from a subject's current state, with the guard
/// verdict already evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDescriptor {
    /// Transition name, as used with `transition_to`
    pub transition_name: String,
    /// Human-readable description, if the definition has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the guard allowed the transition for this subject
    pub is_allowed: bool,
    /// Denial reason; always present when `is_allowed` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TransitionDescriptor {
    /// Build a descriptor from a transition and its evaluated verdict.
    ///
    /// A denial without a guard-supplied reason gets a synthesized one,
    /// so `reason` is never empty when `is_allowed` is false.
    pub fn from_verdict(transition: &WorkflowTransition, verdict: &TransitionVerdict) -> Self {
        let reason = match verdict {
            TransitionVerdict::Allowed => None,
            TransitionVerdict::Denied { reason } => Some(
                reason
                    .clone()
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| {
                        format!("Transition '{}' is not allowed", transition.name)
                    }),
            ),
        };
        Self {
            transition_name: transition.name.clone(),
            description: transition.description.clone(),
            is_allowed: verdict.is_allowed(),
            reason,
        }
    }
}

/// Snapshot of a subject's position in its workflow: where it is and
/// every transition defined there, each with its verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFrame {
    /// The subject's workflow binding and current state
    pub subject: SubjectContext,
    /// All transitions defined on the current state
    pub transitions: Vec<TransitionDescriptor>,
    /// When the snapshot was taken
    pub captured_at: DateTime<Utc>,
}
