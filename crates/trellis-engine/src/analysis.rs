//! Structural analysis of a workflow graph
//!
//! `analyze` is a best-effort health check over possibly broken
//! definitions: it never fails, it reports. Dangling transition
//! destinations, an unresolvable initial state, and unreachable states
//! all land in the report.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::workflow::Workflow;

/// A structural problem found while walking the graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnalysisError {
    /// No initial state is designated, so nothing is reachable
    MissingInitialState,
    /// The designated initial state is not in the state set
    #[serde(rename_all = "camelCase")]
    InitialStateNotFound { state: String },
    /// A transition points at a state name that does not exist
    #[serde(rename_all = "camelCase")]
    DanglingTransition {
        from_state: String,
        transition: String,
        to_state: String,
    },
}

/// Report produced by [`Workflow::analyze`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// States reachable from the initial state
    pub state_count: usize,
    /// Transitions encountered on reachable states, dangling ones included
    pub transition_count: usize,
    /// Structural problems, in discovery order
    pub errors: Vec<AnalysisError>,
    /// States defined in the workflow but never reached by the walk
    pub unreachable_states: Vec<String>,
}

impl AnalysisReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Workflow {
    /// Depth-first reachability walk from the initial state.
    ///
    /// Each state is visited at most once, so cycles are safe. Counts
    /// cover only what the walk reaches; everything else ends up in
    /// `unreachable_states`.
    pub fn analyze(&self) -> AnalysisReport {
        let mut report = AnalysisReport::default();
        let mut visited: BTreeSet<&str> = BTreeSet::new();

        match &self.initial_state {
            None => report.errors.push(AnalysisError::MissingInitialState),
            Some(name) => match self.get_state(name) {
                None => report.errors.push(AnalysisError::InitialStateNotFound {
                    state: name.clone(),
                }),
                Some(initial) => {
                    let mut stack = vec![initial];
                    while let Some(state) = stack.pop() {
                        if !visited.insert(state.name.as_str()) {
                            continue;
                        }
                        report.state_count += 1;
                        for transition in state.transitions.values() {
                            report.transition_count += 1;
                            match self.get_state(&transition.to_state_name) {
                                Some(to_state) => stack.push(to_state),
                                None => {
                                    report.errors.push(AnalysisError::DanglingTransition {
                                        from_state: state.name.clone(),
                                        transition: transition.name.clone(),
                                        to_state: transition.to_state_name.clone(),
                                    })
                                }
                            }
                        }
                    }
                }
            },
        }

        report.unreachable_states = self
            .states
            .keys()
            .filter(|name| !visited.contains(name.as_str()))
            .cloned()
            .collect();

        if report.is_clean() {
            tracing::debug!(
                workflow = %self.full_name,
                states = report.state_count,
                transitions = report.transition_count,
                "Workflow analysis clean"
            );
        } else {
            tracing::warn!(
                workflow = %self.full_name,
                errors = report.errors.len(),
                "Workflow analysis found structural problems"
            );
        }
        report
    }
}
