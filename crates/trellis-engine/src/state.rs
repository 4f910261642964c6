//! States: named nodes holding enter/exit actions and outgoing transitions
//!
//! Transitions are keyed by name in a sorted map, so lookup is exact-match
//! and the serialized document lists them as a name-ordered array.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::activity::{ActivityRegistry, SubjectContext};
use crate::errors::WorkflowResult;
use crate::result::ActionResult;
use crate::transition::WorkflowTransition;

/// A node in the workflow graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    /// Name, unique within the workflow
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Entry guard condition name. Carried in the document model; no
    /// traversal path currently evaluates it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_enter: Option<String>,
    /// Action run when a subject enters this state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enter_action: Option<String>,
    /// Action run when a subject exits this state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_action: Option<String>,
    /// Outgoing transitions, keyed by transition name
    #[serde(
        default,
        with = "transition_seq",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub transitions: BTreeMap<String, WorkflowTransition>,
}

impl WorkflowState {
    /// Create a new state with no actions or transitions
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            can_enter: None,
            enter_action: None,
            exit_action: None,
            transitions: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_can_enter(mut self, condition: impl Into<String>) -> Self {
        self.can_enter = Some(condition.into());
        self
    }

    pub fn with_enter_action(mut self, action: impl Into<String>) -> Self {
        self.enter_action = Some(action.into());
        self
    }

    pub fn with_exit_action(mut self, action: impl Into<String>) -> Self {
        self.exit_action = Some(action.into());
        self
    }

    /// Add an outgoing transition, replacing any previous one of the
    /// same name.
    pub fn with_transition(mut self, transition: WorkflowTransition) -> Self {
        self.transitions
            .insert(transition.name.clone(), transition);
        self
    }

    /// Exact-name lookup among outgoing transitions. Absence is not an
    /// error here; callers decide.
    pub fn get_transition(&self, name: &str) -> Option<&WorkflowTransition> {
        self.transitions.get(name)
    }

    /// Execute the enter action, succeeding immediately when none is
    /// configured.
    pub async fn execute_enter_action(
        &self,
        activities: &ActivityRegistry,
        ctx: &SubjectContext,
    ) -> WorkflowResult<ActionResult> {
        match &self.enter_action {
            Some(name) => activities.action(name)?.execute(ctx).await,
            None => Ok(ActionResult::success()),
        }
    }

    /// Execute the exit action, succeeding immediately when none is
    /// configured.
    pub async fn execute_exit_action(
        &self,
        activities: &ActivityRegistry,
        ctx: &SubjectContext,
    ) -> WorkflowResult<ActionResult> {
        match &self.exit_action {
            Some(name) => activities.action(name)?.execute(ctx).await,
            None => Ok(ActionResult::success()),
        }
    }
}

/// Serializes the name-keyed transition map as a plain array, matching
/// the document shape; the map is rebuilt from transition names on load.
mod transition_seq {
    use super::WorkflowTransition;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(
        map: &BTreeMap<String, WorkflowTransition>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<String, WorkflowTransition>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let transitions = Vec::<WorkflowTransition>::deserialize(deserializer)?;
        Ok(transitions
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_state() -> WorkflowState {
        WorkflowState::new("Reviewing")
            .with_description("Document is under review")
            .with_exit_action("archive-draft")
            .with_transition(WorkflowTransition::new("Approve", "Complete"))
            .with_transition(WorkflowTransition::new("Reject", "Draft"))
    }

    #[test]
    fn test_get_transition_exact_match() {
        let state = make_state();
        assert!(state.get_transition("Approve").is_some());
        assert!(state.get_transition("approve").is_none());
        assert!(state.get_transition("Bogus").is_none());
    }

    #[test]
    fn test_duplicate_transition_name_replaces() {
        let state = make_state()
            .with_transition(WorkflowTransition::new("Approve", "Published"));
        assert_eq!(state.transitions.len(), 2);
        assert_eq!(
            state.get_transition("Approve").unwrap().to_state_name,
            "Published"
        );
    }

    #[tokio::test]
    async fn test_missing_actions_succeed_without_registry_entries() {
        let state = WorkflowState::new("Idle");
        let registry = ActivityRegistry::new();
        let ctx = SubjectContext::new();
        assert!(state
            .execute_enter_action(&registry, &ctx)
            .await
            .unwrap()
            .is_success());
        assert!(state
            .execute_exit_action(&registry, &ctx)
            .await
            .unwrap()
            .is_success());
    }

    #[test]
    fn test_transitions_serialize_as_array() {
        let state = make_state();
        let json = serde_json::to_value(&state).unwrap();
        let transitions = json["transitions"].as_array().unwrap();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0]["name"], "Approve");
        assert_eq!(transitions[1]["name"], "Reject");

        let back: WorkflowState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_can_enter_round_trips_in_camel_case() {
        let state = WorkflowState::new("Reviewing")
            .with_can_enter("reviewer-assigned")
            .with_enter_action("assign-reviewer");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["canEnter"], "reviewer-assigned");
        assert_eq!(json["enterAction"], "assign-reviewer");

        let back: WorkflowState = serde_json::from_value(json).unwrap();
        assert_eq!(back.can_enter.as_deref(), Some("reviewer-assigned"));
        assert_eq!(back, state);
    }
}
