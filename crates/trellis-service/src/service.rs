//! Workflow execution façade
//!
//! [`ExecutionService`] ties a workflow resolver to an activity registry
//! and exposes name-based operations over subjects: starting, guarded
//! transitions, conditional transitions, and introspection of what a
//! subject can do next.
//!
//! # Key Concepts
//!
//! - **Resolution first**: every operation resolves the subject's
//!   workflow by name before touching anything, so a missing definition
//!   fails fast and mutates nothing.
//! - **Shared halves**: resolver and registry both sit behind `Arc`;
//!   clones of the service see the same definitions and activities.

use std::sync::Arc;

use chrono::Utc;

use trellis_engine::{
    ActivityRegistry, CancellationToken, ExecutionResult, Workflow, WorkflowError, WorkflowResult,
    WorkflowSubject, WorkflowTransition,
};

use crate::descriptor::{ExecutionFrame, TransitionDescriptor};
use crate::resolver::WorkflowResolver;

/// Name-based workflow execution over resolver-supplied definitions.
#[derive(Clone)]
pub struct ExecutionService {
    resolver: Arc<dyn WorkflowResolver>,
    activities: Arc<ActivityRegistry>,
}

impl ExecutionService {
    pub fn new(resolver: Arc<dyn WorkflowResolver>, activities: Arc<ActivityRegistry>) -> Self {
        Self {
            resolver,
            activities,
        }
    }

    /// The activity registry this service executes against
    pub fn activities(&self) -> &ActivityRegistry {
        &self.activities
    }

    async fn resolve(&self, name: &str) -> WorkflowResult<Arc<Workflow>> {
        self.resolver
            .resolve(name)
            .await
            .ok_or_else(|| WorkflowError::WorkflowNotFound(name.to_string()))
    }

    /// Resolve the workflow a subject says it is bound to.
    async fn resolve_for_subject<S>(&self, subject: &S) -> WorkflowResult<Arc<Workflow>>
    where
        S: WorkflowSubject + ?Sized,
    {
        let name = match subject.workflow_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(WorkflowError::WorkflowNameMissing),
        };
        self.resolve(&name).await
    }

    /// Bind a subject to the named workflow's initial state.
    pub async fn start_workflow<S>(
        &self,
        subject: &mut S,
        workflow_name: &str,
        cancel: &CancellationToken,
    ) -> WorkflowResult<ExecutionResult>
    where
        S: WorkflowSubject + ?Sized,
    {
        let workflow = self.resolve(workflow_name).await?;
        workflow.start(subject, &self.activities, cancel).await
    }

    /// Start a subject on the workflow it already names.
    ///
    /// Fails with [`WorkflowError::WorkflowNameMissing`] when the
    /// subject carries no workflow name yet; nothing is mutated.
    pub async fn start_subject<S>(
        &self,
        subject: &mut S,
        cancel: &CancellationToken,
    ) -> WorkflowResult<ExecutionResult>
    where
        S: WorkflowSubject + ?Sized,
    {
        let workflow = self.resolve_for_subject(subject).await?;
        workflow.start(subject, &self.activities, cancel).await
    }

    /// Drive a subject through the named transition.
    pub async fn transition_to<S>(
        &self,
        subject: &mut S,
        transition_name: &str,
        cancel: &CancellationToken,
    ) -> WorkflowResult<ExecutionResult>
    where
        S: WorkflowSubject + ?Sized,
    {
        let workflow = self.resolve_for_subject(subject).await?;
        workflow
            .transition_to(subject, transition_name, &self.activities, cancel)
            .await
    }

    /// Fire the transition only when the named condition holds.
    ///
    /// Evaluates the registry condition against the subject's context:
    /// `Ok(Some(result))` when it held and the transition ran,
    /// `Ok(None)` when it did not and nothing happened. Condition
    /// lookup and evaluation errors propagate.
    pub async fn transition_when<S>(
        &self,
        subject: &mut S,
        transition_name: &str,
        condition_name: &str,
        cancel: &CancellationToken,
    ) -> WorkflowResult<Option<ExecutionResult>>
    where
        S: WorkflowSubject + ?Sized,
    {
        let condition = self.activities.condition(condition_name)?;
        if !condition.evaluate(&subject.context()).await? {
            tracing::debug!(
                transition = %transition_name,
                condition = %condition_name,
                "Conditional transition skipped"
            );
            return Ok(None);
        }
        let result = self.transition_to(subject, transition_name, cancel).await?;
        Ok(Some(result))
    }

    /// Every transition defined on the subject's current state.
    pub async fn all_transitions<S>(&self, subject: &S) -> WorkflowResult<Vec<WorkflowTransition>>
    where
        S: WorkflowSubject + ?Sized,
    {
        let workflow = self.resolve_for_subject(subject).await?;
        let state = workflow.current_state_of(subject)?;
        Ok(state.transitions.values().cloned().collect())
    }

    /// The subset of transitions whose guard currently allows the subject.
    pub async fn allowed_transitions<S>(
        &self,
        subject: &S,
    ) -> WorkflowResult<Vec<WorkflowTransition>>
    where
        S: WorkflowSubject + ?Sized,
    {
        let workflow = self.resolve_for_subject(subject).await?;
        let state = workflow.current_state_of(subject)?;
        let ctx = subject.context();
        let mut allowed = Vec::new();
        for transition in state.transitions.values() {
            let verdict = transition.evaluate_guard(&self.activities, &ctx).await;
            if verdict.is_allowed() {
                allowed.push(transition.clone());
            }
        }
        Ok(allowed)
    }

    /// Snapshot the subject's position: its context plus a descriptor
    /// for every transition on its current state.
    pub async fn execution_frame<S>(&self, subject: &S) -> WorkflowResult<ExecutionFrame>
    where
        S: WorkflowSubject + ?Sized,
    {
        let workflow = self.resolve_for_subject(subject).await?;
        let state = workflow.current_state_of(subject)?;
        let ctx = subject.context();
        let mut transitions = Vec::with_capacity(state.transitions.len());
        for transition in state.transitions.values() {
            let verdict = transition.evaluate_guard(&self.activities, &ctx).await;
            transitions.push(TransitionDescriptor::from_verdict(transition, &verdict));
        }
        Ok(ExecutionFrame {
            subject: ctx,
            transitions,
            captured_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for ExecutionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionService")
            .field("activities", &self.activities)
            .finish_non_exhaustive()
    }
}
