//! The capability trait domain objects implement to ride a workflow
//!
//! A subject is any host-owned object that can report and persist two
//! strings, its workflow name and its current state, and hand the
//! engine a [`SubjectContext`] for guards and actions. The engine never
//! creates or destroys subjects; it only mutates `current_state`
//! (and `workflow_name` on start) in place. Persisting the subject after
//! a successful operation is the host's job.

use async_trait::async_trait;

use crate::activity::SubjectContext;
use crate::errors::WorkflowResult;
use crate::transition::WorkflowTransition;
use crate::workflow::Workflow;

/// Capability contract for objects that move through a workflow.
///
/// The three lifecycle hooks default to no-ops. Hook failures do not
/// panic the pipeline; they surface through the execution result.
#[async_trait]
pub trait WorkflowSubject: Send + Sync {
    /// Full name of the workflow this subject is bound to, if any
    fn workflow_name(&self) -> Option<&str>;

    fn set_workflow_name(&mut self, name: &str);

    /// Name of the state this subject currently occupies, if any
    fn current_state(&self) -> Option<&str>;

    fn set_current_state(&mut self, state: &str);

    /// Snapshot handed to guard conditions and actions
    fn context(&self) -> SubjectContext;

    /// Called after the subject has been bound to a workflow's initial state.
    async fn on_started(&mut self, _workflow: &Workflow) -> WorkflowResult<()> {
        Ok(())
    }

    /// Called before the transition pipeline runs any action.
    async fn on_transitioning_to(
        &mut self,
        _workflow: &Workflow,
        _transition: &WorkflowTransition,
    ) -> WorkflowResult<()> {
        Ok(())
    }

    /// Called after the transition action succeeded, just before
    /// `current_state` is updated.
    async fn on_transitioned_to(
        &mut self,
        _workflow: &Workflow,
        _transition: &WorkflowTransition,
    ) -> WorkflowResult<()> {
        Ok(())
    }
}
