//! Outcome values for workflow operations
//!
//! Every `start` / `transition_to` call resolves to an [`ExecutionResult`]
//! classifying what happened. Structural problems found before the pipeline
//! runs (unknown state, unknown transition) surface as errors instead; once
//! the pipeline is underway, failures are folded into the result so callers
//! always get a typed outcome.

use crate::errors::WorkflowError;

// ── Action results ───────────────────────────────────────────────────

/// Outcome of a single enter/exit/transition action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionResult {
    /// Whether the action succeeded
    pub success: bool,
    /// Human-readable description, usually set on failure
    pub description: Option<String>,
}

impl ActionResult {
    /// A successful action outcome with no description.
    pub fn success() -> Self {
        Self {
            success: true,
            description: None,
        }
    }

    /// A failed action outcome with a description of what went wrong.
    pub fn failed(description: impl Into<String>) -> Self {
        Self {
            success: false,
            description: Some(description.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

// ── Execution results ────────────────────────────────────────────────

/// Classification of a workflow operation outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionCode {
    /// The operation completed and the subject was moved.
    Success,
    /// A guard condition denied the transition; the subject is untouched.
    NotAllowed,
    /// An enter/exit/transition action reported failure.
    ActionFailed,
    /// An activity or lifecycle hook raised an error mid-pipeline.
    Error,
    /// A cancellation signal aborted the operation at a stage boundary.
    Cancelled,
}

/// Outcome of a `start` or `transition_to` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    /// What happened
    pub code: ExecutionCode,
    /// Human-readable description of the outcome
    pub description: Option<String>,
    /// The failing action's own result, when `code` is `ActionFailed`
    pub action_result: Option<ActionResult>,
    /// The underlying error, when `code` is `Error` or `Cancelled`
    pub error: Option<WorkflowError>,
}

impl ExecutionResult {
    /// The common all-good outcome.
    pub fn success() -> Self {
        Self {
            code: ExecutionCode::Success,
            description: None,
            action_result: None,
            error: None,
        }
    }

    /// A guard denied the transition.
    pub fn not_allowed(description: impl Into<String>) -> Self {
        Self {
            code: ExecutionCode::NotAllowed,
            description: Some(description.into()),
            action_result: None,
            error: None,
        }
    }

    /// An action reported failure; carries the action's own result.
    pub fn action_failed(action_result: ActionResult) -> Self {
        Self {
            code: ExecutionCode::ActionFailed,
            description: action_result.description.clone(),
            action_result: Some(action_result),
            error: None,
        }
    }

    /// An activity or hook error was caught mid-pipeline.
    pub fn from_error(error: WorkflowError) -> Self {
        Self {
            code: ExecutionCode::Error,
            description: Some(error.to_string()),
            action_result: None,
            error: Some(error),
        }
    }

    /// The operation was aborted by a cancellation signal before `stage`.
    pub fn cancelled(stage: &'static str) -> Self {
        let error = WorkflowError::Cancelled { stage };
        Self {
            code: ExecutionCode::Cancelled,
            description: Some(error.to_string()),
            action_result: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ExecutionCode::Success
    }
}
