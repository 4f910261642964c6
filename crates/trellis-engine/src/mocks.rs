use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::activity::{Action, Condition, SubjectContext};
use crate::errors::{WorkflowError, WorkflowResult};
use crate::result::ActionResult;
use crate::subject::WorkflowSubject;
use crate::transition::WorkflowTransition;
use crate::workflow::Workflow;

/// Shared, clonable journal recording what mocks observed, in order.
#[derive(Clone, Debug, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        if let Ok(mut entries) = self.0.lock() {
            entries.push(entry.into());
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().map(|entries| entries.clone()).unwrap_or_default()
    }
}

/// Mock workflow subject for testing.
///
/// Records every lifecycle hook into its journal and keeps the name of
/// the last transition taken.
pub struct MockSubject {
    pub workflow_name: Option<String>,
    pub current_state: Option<String>,
    pub payload: serde_json::Value,
    pub last_transition: Option<String>,
    journal: Journal,
    failing_hook: Option<&'static str>,
}

impl MockSubject {
    pub fn new() -> Self {
        Self {
            workflow_name: None,
            current_state: None,
            payload: serde_json::Value::Null,
            last_transition: None,
            journal: Journal::new(),
            failing_hook: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Share a journal with mock activities so hook and action ordering
    /// can be asserted together.
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Make the named hook (`on_started`, `on_transitioning_to`,
    /// `on_transitioned_to`) return an error.
    pub fn with_failing_hook(mut self, hook: &'static str) -> Self {
        self.failing_hook = Some(hook);
        self
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn hook(&mut self, name: &'static str, entry: String) -> WorkflowResult<()> {
        self.journal.push(entry);
        if self.failing_hook == Some(name) {
            return Err(WorkflowError::activity(format!("{} failed", name)));
        }
        Ok(())
    }
}

impl Default for MockSubject {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowSubject for MockSubject {
    fn workflow_name(&self) -> Option<&str> {
        self.workflow_name.as_deref()
    }

    fn set_workflow_name(&mut self, name: &str) {
        self.workflow_name = Some(name.to_string());
    }

    fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    fn set_current_state(&mut self, state: &str) {
        self.current_state = Some(state.to_string());
    }

    fn context(&self) -> SubjectContext {
        SubjectContext {
            workflow_name: self.workflow_name.clone(),
            current_state: self.current_state.clone(),
            payload: self.payload.clone(),
        }
    }

    async fn on_started(&mut self, workflow: &Workflow) -> WorkflowResult<()> {
        let entry = format!("on_started:{}", workflow.full_name);
        self.hook("on_started", entry)
    }

    async fn on_transitioning_to(
        &mut self,
        _workflow: &Workflow,
        transition: &WorkflowTransition,
    ) -> WorkflowResult<()> {
        let entry = format!("on_transitioning_to:{}", transition.name);
        self.hook("on_transitioning_to", entry)
    }

    async fn on_transitioned_to(
        &mut self,
        _workflow: &Workflow,
        transition: &WorkflowTransition,
    ) -> WorkflowResult<()> {
        self.last_transition = Some(transition.name.clone());
        let entry = format!("on_transitioned_to:{}", transition.name);
        self.hook("on_transitioned_to", entry)
    }
}

/// Mock condition returning a fixed verdict.
pub struct StaticCondition {
    verdict: bool,
}

impl StaticCondition {
    pub fn new(verdict: bool) -> Self {
        Self { verdict }
    }
}

#[async_trait]
impl Condition for StaticCondition {
    async fn evaluate(&self, _ctx: &SubjectContext) -> WorkflowResult<bool> {
        Ok(self.verdict)
    }
}

/// Mock condition that always errors, standing in for a guard whose
/// evaluation blew up.
pub struct ErringCondition {
    message: String,
}

impl ErringCondition {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Condition for ErringCondition {
    async fn evaluate(&self, _ctx: &SubjectContext) -> WorkflowResult<bool> {
        Err(WorkflowError::activity(self.message.clone()))
    }
}

/// Mock condition reading a boolean flag out of the subject payload.
pub struct PayloadFlagCondition {
    key: String,
}

impl PayloadFlagCondition {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl Condition for PayloadFlagCondition {
    async fn evaluate(&self, ctx: &SubjectContext) -> WorkflowResult<bool> {
        Ok(ctx.payload[&self.key].as_bool().unwrap_or(false))
    }
}

/// Mock action that records its run into a journal and succeeds.
pub struct RecordingAction {
    name: String,
    journal: Journal,
}

impl RecordingAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            journal: Journal::new(),
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }
}

#[async_trait]
impl Action for RecordingAction {
    async fn execute(&self, _ctx: &SubjectContext) -> WorkflowResult<ActionResult> {
        self.journal.push(format!("action:{}", self.name));
        Ok(ActionResult::success())
    }
}

/// Mock action that records its run, then reports failure.
pub struct FailingAction {
    name: String,
    description: String,
    journal: Journal,
}

impl FailingAction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            journal: Journal::new(),
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }
}

#[async_trait]
impl Action for FailingAction {
    async fn execute(&self, _ctx: &SubjectContext) -> WorkflowResult<ActionResult> {
        self.journal.push(format!("action:{}", self.name));
        Ok(ActionResult::failed(self.description.clone()))
    }
}

/// Mock action that errors instead of returning a result.
pub struct ErringAction {
    message: String,
}

impl ErringAction {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Action for ErringAction {
    async fn execute(&self, _ctx: &SubjectContext) -> WorkflowResult<ActionResult> {
        Err(WorkflowError::activity(self.message.clone()))
    }
}
