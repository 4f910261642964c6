//! Error types for the workflow engine

/// Errors that can occur in workflow operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Workflow '{workflow}' has no initial state")]
    NoInitialState { workflow: String },

    #[error("State '{state}' not found in workflow '{workflow}'")]
    StateNotFound { workflow: String, state: String },

    #[error("No current state set on subject of workflow '{workflow}'")]
    CurrentStateUnset { workflow: String },

    #[error("Transition '{transition}' not found in state '{state}' of workflow '{workflow}'")]
    TransitionNotFound {
        workflow: String,
        state: String,
        transition: String,
    },

    #[error("Condition not registered: {0}")]
    ConditionNotRegistered(String),

    #[error("Action not registered: {0}")]
    ActionNotRegistered(String),

    #[error("Activity error: {0}")]
    Activity(String),

    #[error("Transition name must not be empty")]
    TransitionNameEmpty,

    #[error("No workflow name set on subject")]
    WorkflowNameMissing,

    #[error("Invalid workflow definition: {0}")]
    InvalidDefinition(String),

    #[error("Cancelled before {stage}")]
    Cancelled { stage: &'static str },
}

impl WorkflowError {
    /// Wrap an arbitrary failure raised inside a condition, action, or
    /// lifecycle hook.
    pub fn activity(message: impl Into<String>) -> Self {
        Self::Activity(message.into())
    }
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
