//! The workflow aggregate and its transition algorithm
//!
//! A `Workflow` is a named graph of states with one designated initial
//! state. It owns the three subject-facing operations:
//!
//! - `start` binds a subject to the initial state
//! - `transition_to` moves a subject along a named transition, running
//!   guard, exit action, transition action, lifecycle hooks, and enter
//!   action in strict sequence with stop-on-first-failure semantics
//! - `is_transition_allowed` evaluates a guard without touching the subject
//!
//! The definition graph is read-only during execution; share it as
//! `Arc<Workflow>` across subjects. Cancellation is checked only at
//! stage boundaries, placed so an abort can never leave a subject with
//! a half-applied state change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::activity::ActivityRegistry;
use crate::errors::{WorkflowError, WorkflowResult};
use crate::result::{ActionResult, ExecutionResult};
use crate::state::WorkflowState;
use crate::subject::WorkflowSubject;
use crate::transition::TransitionVerdict;

/// A named graph of states and guarded transitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Fully-qualified name; the part after the last `.` is the short name
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Name of the initial state; kept as a member of `states` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,
    /// States keyed by name
    #[serde(
        default,
        with = "state_seq",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub states: BTreeMap<String, WorkflowState>,
}

impl Workflow {
    /// Create a new workflow with no states
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            display_name: None,
            initial_state: None,
            states: BTreeMap::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_state(mut self, state: WorkflowState) -> Self {
        self.add_state(state);
        self
    }

    pub fn with_initial_state(mut self, state: WorkflowState) -> Self {
        self.set_initial_state(state);
        self
    }

    /// Add a state, replacing any previous state of the same name.
    pub fn add_state(&mut self, state: WorkflowState) {
        self.states.insert(state.name.clone(), state);
    }

    /// Designate `state` as the initial state, adding it to the state
    /// set and removing the previously designated one (unless it is the
    /// same state by name).
    pub fn set_initial_state(&mut self, state: WorkflowState) {
        if let Some(old) = self.initial_state.take() {
            if old != state.name {
                self.states.remove(&old);
            }
        }
        self.initial_state = Some(state.name.clone());
        self.add_state(state);
    }

    /// Namespace portion of the full name, if any (`"Test.Foo"` → `"Test"`)
    pub fn namespace(&self) -> Option<&str> {
        self.full_name.rsplit_once('.').map(|(ns, _)| ns)
    }

    /// Short name portion of the full name (`"Test.Foo"` → `"Foo"`)
    pub fn short_name(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map(|(_, name)| name)
            .unwrap_or(&self.full_name)
    }

    /// Display name, falling back to the short name when none is set
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.short_name())
    }

    /// Get a state by name
    pub fn get_state(&self, name: &str) -> Option<&WorkflowState> {
        self.states.get(name)
    }

    /// Resolve the initial state, if one is designated
    pub fn initial(&self) -> Option<&WorkflowState> {
        self.initial_state
            .as_deref()
            .and_then(|name| self.states.get(name))
    }

    /// Resolve the state a subject currently occupies.
    ///
    /// Fails with [`WorkflowError::CurrentStateUnset`] when the subject
    /// has not been started, and [`WorkflowError::StateNotFound`] when
    /// the subject names a state this workflow does not define.
    pub fn current_state_of<S>(&self, subject: &S) -> WorkflowResult<&WorkflowState>
    where
        S: WorkflowSubject + ?Sized,
    {
        let current = match subject.current_state() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(WorkflowError::CurrentStateUnset {
                    workflow: self.full_name.clone(),
                })
            }
        };
        self.get_state(current)
            .ok_or_else(|| WorkflowError::StateNotFound {
                workflow: self.full_name.clone(),
                state: current.to_string(),
            })
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Bind a subject to this workflow's initial state.
    ///
    /// Runs the initial state's enter action first; if it fails, the
    /// subject is left unbound and the result reports the failure. On
    /// success the subject's workflow name and current state are set and
    /// `on_started` fires.
    pub async fn start<S>(
        &self,
        subject: &mut S,
        activities: &ActivityRegistry,
        cancel: &CancellationToken,
    ) -> WorkflowResult<ExecutionResult>
    where
        S: WorkflowSubject + ?Sized,
    {
        let initial = match &self.initial_state {
            Some(name) => {
                self.get_state(name)
                    .ok_or_else(|| WorkflowError::StateNotFound {
                        workflow: self.full_name.clone(),
                        state: name.clone(),
                    })?
            }
            None => {
                return Err(WorkflowError::NoInitialState {
                    workflow: self.full_name.clone(),
                })
            }
        };

        if cancel.is_cancelled() {
            tracing::warn!(workflow = %self.full_name, "Start cancelled");
            return Ok(ExecutionResult::cancelled("initial enter action"));
        }

        let enter_res = match initial.execute_enter_action(activities, &subject.context()).await {
            Ok(res) => res,
            Err(err) => return Ok(ExecutionResult::from_error(err)),
        };
        if !enter_res.is_success() {
            tracing::warn!(
                workflow = %self.full_name,
                state = %initial.name,
                "Initial enter action failed; subject left unbound"
            );
            return Ok(ExecutionResult::action_failed(enter_res));
        }

        subject.set_workflow_name(&self.full_name);
        subject.set_current_state(&initial.name);

        if let Err(err) = subject.on_started(self).await {
            return Ok(ExecutionResult::from_error(err));
        }

        tracing::info!(
            workflow = %self.full_name,
            state = %initial.name,
            "Workflow started"
        );
        Ok(ExecutionResult::success())
    }

    /// Evaluate whether the named transition out of the subject's current
    /// state is allowed right now. Pure query; the subject is not touched.
    pub async fn is_transition_allowed<S>(
        &self,
        subject: &S,
        transition_name: &str,
        activities: &ActivityRegistry,
    ) -> WorkflowResult<TransitionVerdict>
    where
        S: WorkflowSubject + ?Sized,
    {
        let from_state = self.current_state_of(subject)?;
        let transition = from_state.get_transition(transition_name).ok_or_else(|| {
            WorkflowError::TransitionNotFound {
                workflow: self.full_name.clone(),
                state: from_state.name.clone(),
                transition: transition_name.to_string(),
            }
        })?;
        Ok(transition.evaluate_guard(activities, &subject.context()).await)
    }

    /// Move a subject along the named transition.
    ///
    /// Stage order: guard, destination resolution, `on_transitioning_to`,
    /// exit action, transition action, `on_transitioned_to`, state change,
    /// enter action. The first failing stage stops the pipeline; the
    /// subject's `current_state` changes only after the transition action
    /// has succeeded, so every earlier failure leaves it untouched. An
    /// enter-action failure is reported after the state change has already
    /// been applied.
    ///
    /// Structural problems (unknown state, unknown transition, dangling
    /// destination) return `Err`; everything after those lookups is folded
    /// into the returned [`ExecutionResult`].
    pub async fn transition_to<S>(
        &self,
        subject: &mut S,
        transition_name: &str,
        activities: &ActivityRegistry,
        cancel: &CancellationToken,
    ) -> WorkflowResult<ExecutionResult>
    where
        S: WorkflowSubject + ?Sized,
    {
        if transition_name.is_empty() {
            return Err(WorkflowError::TransitionNameEmpty);
        }

        let from_state = self.current_state_of(subject)?;
        let transition = from_state.get_transition(transition_name).ok_or_else(|| {
            WorkflowError::TransitionNotFound {
                workflow: self.full_name.clone(),
                state: from_state.name.clone(),
                transition: transition_name.to_string(),
            }
        })?;

        tracing::debug!(
            workflow = %self.full_name,
            from = %from_state.name,
            transition = %transition.name,
            "Evaluating transition guard"
        );

        let verdict = transition.evaluate_guard(activities, &subject.context()).await;
        if let TransitionVerdict::Denied { reason } = verdict {
            let description = match reason {
                Some(reason) => {
                    format!("Transition '{}' is not allowed: {}", transition_name, reason)
                }
                None => format!("Transition '{}' is not allowed", transition_name),
            };
            tracing::warn!(
                workflow = %self.full_name,
                transition = %transition_name,
                "Transition denied by guard"
            );
            return Ok(ExecutionResult::not_allowed(description));
        }

        let to_state = self.get_state(&transition.to_state_name).ok_or_else(|| {
            WorkflowError::StateNotFound {
                workflow: self.full_name.clone(),
                state: transition.to_state_name.clone(),
            }
        })?;

        if cancel.is_cancelled() {
            return Ok(self.halt_on_cancel(transition_name, "exit action"));
        }

        if let Err(err) = subject.on_transitioning_to(self, transition).await {
            return Ok(ExecutionResult::from_error(err));
        }

        let exit_res = match from_state
            .execute_exit_action(activities, &subject.context())
            .await
        {
            Ok(res) => res,
            Err(err) => return Ok(ExecutionResult::from_error(err)),
        };
        if !exit_res.is_success() {
            return Ok(self.halt_on_action(transition_name, "exit", exit_res));
        }

        if cancel.is_cancelled() {
            return Ok(self.halt_on_cancel(transition_name, "transition action"));
        }

        let action_res = match transition
            .execute_action(activities, &subject.context())
            .await
        {
            Ok(res) => res,
            Err(err) => return Ok(ExecutionResult::from_error(err)),
        };
        if !action_res.is_success() {
            return Ok(self.halt_on_action(transition_name, "transition", action_res));
        }

        // Last checkpoint: from here the pipeline runs to completion so
        // the subject is never left with a half-applied state change.
        if cancel.is_cancelled() {
            return Ok(self.halt_on_cancel(transition_name, "state change"));
        }

        if let Err(err) = subject.on_transitioned_to(self, transition).await {
            return Ok(ExecutionResult::from_error(err));
        }

        subject.set_current_state(&to_state.name);

        let enter_res = match to_state
            .execute_enter_action(activities, &subject.context())
            .await
        {
            Ok(res) => res,
            Err(err) => return Ok(ExecutionResult::from_error(err)),
        };
        if !enter_res.is_success() {
            return Ok(self.halt_on_action(transition_name, "enter", enter_res));
        }

        tracing::info!(
            workflow = %self.full_name,
            from = %from_state.name,
            to = %to_state.name,
            transition = %transition.name,
            "Transition completed"
        );
        Ok(ExecutionResult::success())
    }

    fn halt_on_action(
        &self,
        transition_name: &str,
        stage: &str,
        action_res: ActionResult,
    ) -> ExecutionResult {
        tracing::warn!(
            workflow = %self.full_name,
            transition = %transition_name,
            stage = %stage,
            "Action failed; transition halted"
        );
        ExecutionResult::action_failed(action_res)
    }

    fn halt_on_cancel(&self, transition_name: &str, stage: &'static str) -> ExecutionResult {
        tracing::warn!(
            workflow = %self.full_name,
            transition = %transition_name,
            stage = %stage,
            "Transition cancelled"
        );
        ExecutionResult::cancelled(stage)
    }
}

/// Serializes the name-keyed state map as a plain array, matching the
/// document shape; the map is rebuilt from state names on load.
mod state_seq {
    use super::WorkflowState;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(
        map: &BTreeMap<String, WorkflowState>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<String, WorkflowState>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let states = Vec::<WorkflowState>::deserialize(deserializer)?;
        Ok(states.into_iter().map(|s| (s.name.clone(), s)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        ErringAction, FailingAction, Journal, MockSubject, RecordingAction, StaticCondition,
    };
    use crate::result::ExecutionCode;
    use crate::transition::WorkflowTransition;
    use std::sync::Arc;

    /// `Test.Foo`: Reviewing (initial) --Approve--> Complete
    fn make_workflow() -> Workflow {
        Workflow::new("Test.Foo")
            .with_display_name("Foo Review")
            .with_initial_state(
                WorkflowState::new("Reviewing").with_transition(
                    WorkflowTransition::new("Approve", "Complete"),
                ),
            )
            .with_state(WorkflowState::new("Complete"))
    }

    fn make_subject_in(state: &str) -> MockSubject {
        let mut subject = MockSubject::new();
        subject.workflow_name = Some("Test.Foo".into());
        subject.current_state = Some(state.into());
        subject
    }

    #[test]
    fn test_name_split_on_last_separator() {
        let wf = Workflow::new("Acme.Docs.Review");
        assert_eq!(wf.namespace(), Some("Acme.Docs"));
        assert_eq!(wf.short_name(), "Review");

        let flat = Workflow::new("Review");
        assert_eq!(flat.namespace(), None);
        assert_eq!(flat.short_name(), "Review");
    }

    #[test]
    fn test_display_label_falls_back_to_short_name() {
        assert_eq!(make_workflow().display_label(), "Foo Review");
        assert_eq!(Workflow::new("Test.Foo").display_label(), "Foo");
    }

    #[test]
    fn test_set_initial_state_swaps_membership() {
        let mut wf = make_workflow();
        assert!(wf.get_state("Reviewing").is_some());

        wf.set_initial_state(WorkflowState::new("Draft"));
        assert_eq!(wf.initial_state.as_deref(), Some("Draft"));
        assert!(wf.get_state("Draft").is_some());
        assert!(wf.get_state("Reviewing").is_none());
        assert!(wf.get_state("Complete").is_some());
    }

    #[test]
    fn test_initial_state_always_member() {
        let wf = make_workflow();
        let initial = wf.initial().unwrap();
        assert_eq!(initial.name, "Reviewing");
        assert!(wf.states.contains_key("Reviewing"));
    }

    #[tokio::test]
    async fn test_start_binds_subject_and_fires_hook() {
        let wf = make_workflow();
        let mut subject = MockSubject::new();
        let res = wf
            .start(&mut subject, &ActivityRegistry::new(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(res.is_success());
        assert_eq!(subject.workflow_name.as_deref(), Some("Test.Foo"));
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
        assert_eq!(subject.journal().entries(), vec!["on_started:Test.Foo"]);
    }

    #[tokio::test]
    async fn test_start_without_initial_state_errors() {
        let wf = Workflow::new("Test.Empty").with_state(WorkflowState::new("Lonely"));
        let mut subject = MockSubject::new();
        let err = wf
            .start(&mut subject, &ActivityRegistry::new(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::NoInitialState {
                workflow: "Test.Empty".into()
            }
        );
        assert!(subject.workflow_name.is_none());
    }

    #[tokio::test]
    async fn test_start_fails_when_initial_enter_action_fails() {
        let journal = Journal::new();
        let mut activities = ActivityRegistry::new();
        activities.register_action(
            "setup",
            Arc::new(
                FailingAction::new("setup", "queue unavailable").with_journal(journal.clone()),
            ),
        );

        let wf = Workflow::new("Test.Foo").with_initial_state(
            WorkflowState::new("Reviewing").with_enter_action("setup"),
        );
        let mut subject = MockSubject::new();
        let res = wf
            .start(&mut subject, &activities, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(res.code, ExecutionCode::ActionFailed);
        assert_eq!(res.description.as_deref(), Some("queue unavailable"));
        // Subject stays unbound: no name, no state, no started hook.
        assert!(subject.workflow_name.is_none());
        assert!(subject.current_state.is_none());
        assert_eq!(journal.entries(), vec!["action:setup"]);
    }

    #[tokio::test]
    async fn test_transition_success_moves_subject() {
        let wf = make_workflow();
        let mut subject = MockSubject::new();
        let activities = ActivityRegistry::new();
        let cancel = CancellationToken::new();

        wf.start(&mut subject, &activities, &cancel).await.unwrap();
        let res = wf
            .transition_to(&mut subject, "Approve", &activities, &cancel)
            .await
            .unwrap();

        assert!(res.is_success());
        assert_eq!(subject.current_state.as_deref(), Some("Complete"));
        assert_eq!(subject.last_transition.as_deref(), Some("Approve"));
        assert_eq!(
            subject.journal().entries(),
            vec![
                "on_started:Test.Foo",
                "on_transitioning_to:Approve",
                "on_transitioned_to:Approve",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_transition_references_state_and_name() {
        let wf = make_workflow();
        let mut subject = make_subject_in("Reviewing");
        let err = wf
            .transition_to(
                &mut subject,
                "Bogus",
                &ActivityRegistry::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::TransitionNotFound {
                workflow: "Test.Foo".into(),
                state: "Reviewing".into(),
                transition: "Bogus".into(),
            }
        );
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
    }

    #[tokio::test]
    async fn test_empty_transition_name_is_hard_error() {
        let wf = make_workflow();
        let mut subject = make_subject_in("Reviewing");
        let err = wf
            .transition_to(
                &mut subject,
                "",
                &ActivityRegistry::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::TransitionNameEmpty);
    }

    #[tokio::test]
    async fn test_unset_current_state_errors() {
        let wf = make_workflow();
        let mut subject = MockSubject::new();
        let err = wf
            .transition_to(
                &mut subject,
                "Approve",
                &ActivityRegistry::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::CurrentStateUnset {
                workflow: "Test.Foo".into()
            }
        );
    }

    #[tokio::test]
    async fn test_guard_denial_leaves_subject_untouched() {
        let mut activities = ActivityRegistry::new();
        activities.register_condition("never", Arc::new(StaticCondition::new(false)));

        let wf = Workflow::new("Test.Foo")
            .with_initial_state(WorkflowState::new("Reviewing").with_transition(
                WorkflowTransition::new("Approve", "Complete")
                    .with_condition("never"),
            ))
            .with_state(WorkflowState::new("Complete"));

        let mut subject = make_subject_in("Reviewing");
        let res = wf
            .transition_to(&mut subject, "Approve", &activities, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(res.code, ExecutionCode::NotAllowed);
        assert!(res.description.unwrap().contains("Approve"));
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
        // Denial happens before any hook or action fires.
        assert!(subject.journal().entries().is_empty());
    }

    #[tokio::test]
    async fn test_exit_action_failure_stops_pipeline() {
        let journal = Journal::new();
        let mut activities = ActivityRegistry::new();
        activities.register_action(
            "teardown",
            Arc::new(FailingAction::new("teardown", "lock held").with_journal(journal.clone())),
        );
        activities.register_action(
            "notify",
            Arc::new(RecordingAction::new("notify").with_journal(journal.clone())),
        );

        let wf = Workflow::new("Test.Foo")
            .with_initial_state(
                WorkflowState::new("Reviewing")
                    .with_exit_action("teardown")
                    .with_transition(
                        WorkflowTransition::new("Approve", "Complete")
                            .with_action("notify"),
                    ),
            )
            .with_state(WorkflowState::new("Complete"));

        let mut subject = make_subject_in("Reviewing").with_journal(journal.clone());
        let res = wf
            .transition_to(&mut subject, "Approve", &activities, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(res.code, ExecutionCode::ActionFailed);
        assert_eq!(res.description.as_deref(), Some("lock held"));
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
        // The transition action never ran and no post-transition hook fired.
        assert_eq!(
            journal.entries(),
            vec!["on_transitioning_to:Approve", "action:teardown"]
        );
    }

    #[tokio::test]
    async fn test_transition_action_failure_keeps_state() {
        let mut activities = ActivityRegistry::new();
        activities.register_action(
            "notify",
            Arc::new(FailingAction::new("notify", "smtp down")),
        );

        let wf = Workflow::new("Test.Foo")
            .with_initial_state(WorkflowState::new("Reviewing").with_transition(
                WorkflowTransition::new("Approve", "Complete")
                    .with_action("notify"),
            ))
            .with_state(WorkflowState::new("Complete"));

        let mut subject = make_subject_in("Reviewing");
        let res = wf
            .transition_to(&mut subject, "Approve", &activities, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(res.code, ExecutionCode::ActionFailed);
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
        assert!(subject.last_transition.is_none());
    }

    #[tokio::test]
    async fn test_enter_action_failure_after_state_change() {
        let mut activities = ActivityRegistry::new();
        activities.register_action(
            "index",
            Arc::new(FailingAction::new("index", "index rebuild failed")),
        );

        let wf = Workflow::new("Test.Foo")
            .with_initial_state(WorkflowState::new("Reviewing").with_transition(
                WorkflowTransition::new("Approve", "Complete"),
            ))
            .with_state(WorkflowState::new("Complete").with_enter_action("index"));

        let mut subject = make_subject_in("Reviewing");
        let res = wf
            .transition_to(&mut subject, "Approve", &activities, &CancellationToken::new())
            .await
            .unwrap();

        // The state change is already applied when the enter action fails.
        assert_eq!(res.code, ExecutionCode::ActionFailed);
        assert_eq!(res.description.as_deref(), Some("index rebuild failed"));
        assert_eq!(subject.current_state.as_deref(), Some("Complete"));
    }

    #[tokio::test]
    async fn test_erring_action_yields_error_result() {
        let mut activities = ActivityRegistry::new();
        activities.register_action("notify", Arc::new(ErringAction::new("connection reset")));

        let wf = Workflow::new("Test.Foo")
            .with_initial_state(WorkflowState::new("Reviewing").with_transition(
                WorkflowTransition::new("Approve", "Complete")
                    .with_action("notify"),
            ))
            .with_state(WorkflowState::new("Complete"));

        let mut subject = make_subject_in("Reviewing");
        let res = wf
            .transition_to(&mut subject, "Approve", &activities, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(res.code, ExecutionCode::Error);
        assert_eq!(
            res.error,
            Some(WorkflowError::Activity("connection reset".into()))
        );
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
    }

    #[tokio::test]
    async fn test_unregistered_action_yields_error_result() {
        let wf = Workflow::new("Test.Foo")
            .with_initial_state(WorkflowState::new("Reviewing").with_transition(
                WorkflowTransition::new("Approve", "Complete")
                    .with_action("ghost"),
            ))
            .with_state(WorkflowState::new("Complete"));

        let mut subject = make_subject_in("Reviewing");
        let res = wf
            .transition_to(
                &mut subject,
                "Approve",
                &ActivityRegistry::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(res.code, ExecutionCode::Error);
        assert_eq!(
            res.error,
            Some(WorkflowError::ActionNotRegistered("ghost".into()))
        );
    }

    #[tokio::test]
    async fn test_dangling_destination_is_structural_error() {
        let wf = Workflow::new("Test.Foo").with_initial_state(
            WorkflowState::new("Reviewing").with_transition(
                WorkflowTransition::new("Approve", "Nowhere"),
            ),
        );

        let mut subject = make_subject_in("Reviewing");
        let err = wf
            .transition_to(
                &mut subject,
                "Approve",
                &ActivityRegistry::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::StateNotFound {
                workflow: "Test.Foo".into(),
                state: "Nowhere".into(),
            }
        );
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
    }

    #[tokio::test]
    async fn test_failing_post_transition_hook_keeps_state() {
        let wf = make_workflow();
        let mut subject =
            make_subject_in("Reviewing").with_failing_hook("on_transitioned_to");
        let res = wf
            .transition_to(
                &mut subject,
                "Approve",
                &ActivityRegistry::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        // The hook runs before the state change, so the subject is unmoved.
        assert_eq!(res.code, ExecutionCode::Error);
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_before_any_side_effect() {
        let wf = make_workflow();
        let mut subject = make_subject_in("Reviewing");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let res = wf
            .transition_to(&mut subject, "Approve", &ActivityRegistry::new(), &cancel)
            .await
            .unwrap();

        assert_eq!(res.code, ExecutionCode::Cancelled);
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
        assert!(subject.journal().entries().is_empty());
    }

    #[tokio::test]
    async fn test_is_transition_allowed_is_pure() {
        let mut activities = ActivityRegistry::new();
        activities.register_condition("never", Arc::new(StaticCondition::new(false)));

        let wf = Workflow::new("Test.Foo")
            .with_initial_state(WorkflowState::new("Reviewing").with_transition(
                WorkflowTransition::new("Approve", "Complete")
                    .with_condition("never"),
            ))
            .with_state(WorkflowState::new("Complete"));

        let subject = make_subject_in("Reviewing");
        let verdict = wf
            .is_transition_allowed(&subject, "Approve", &activities)
            .await
            .unwrap();
        assert!(!verdict.is_allowed());
        assert_eq!(subject.current_state.as_deref(), Some("Reviewing"));
    }

    #[test]
    fn test_document_round_trip() {
        let wf = make_workflow();
        let json = serde_json::to_value(&wf).unwrap();
        assert_eq!(json["fullName"], "Test.Foo");
        assert_eq!(json["displayName"], "Foo Review");
        assert_eq!(json["initialState"], "Reviewing");
        let states = json["states"].as_array().unwrap();
        assert_eq!(states.len(), 2);

        let back: Workflow = serde_json::from_value(json).unwrap();
        assert_eq!(back, wf);
        assert_eq!(back.initial().unwrap().name, "Reviewing");
    }
}
