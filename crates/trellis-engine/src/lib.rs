//! Workflow state-machine core
//!
//! Applies named state machines to host-defined subject objects, moving
//! them between named states along named, guarded transitions and running
//! side-effecting actions at each step.
//!
//! # Key Concepts
//!
//! - **Workflow**: a named graph of states with one designated initial
//!   state; owns `start`, `transition_to`, `is_transition_allowed`, and
//!   the structural `analyze` walk.
//! - **WorkflowState**: a node holding optional enter/exit actions and
//!   its outgoing transitions, keyed by name.
//! - **WorkflowTransition**: a guarded edge referencing its destination
//!   state by name; guard evaluation yields a [`TransitionVerdict`]
//!   value, never a write-back.
//! - **WorkflowSubject**: the capability trait a domain object implements
//!   to participate: two string properties, a context snapshot, and
//!   three lifecycle hooks.
//! - **Condition / Action**: async collaborators registered by name in an
//!   [`ActivityRegistry`]; definitions reference them by those names.
//! - **ExecutionResult**: typed outcome of `start`/`transition_to`,
//!   classifying success, guard denial, action failure, activity error,
//!   or cancellation.
//!
//! # Design Principles
//!
//! 1. Definitions are data: loaded once, shared read-only, safe to
//!    evaluate concurrently against different subjects.
//! 2. The pipeline is strictly sequential and stops at the first
//!    failure; the subject's state changes only after the transition
//!    action has succeeded.
//! 3. Guards fail closed: an erroring condition denies the transition
//!    and the reason travels in the verdict.
//! 4. Structural lookups fail loudly with context; mid-pipeline
//!    failures fold into the execution result so callers always get a
//!    typed outcome.

#![deny(unsafe_code)]

mod activity;
mod analysis;
mod errors;
pub mod mocks;
mod result;
mod state;
mod subject;
mod transition;
mod workflow;

pub use activity::{Action, ActivityRegistry, Condition, SubjectContext};
pub use analysis::{AnalysisError, AnalysisReport};
pub use errors::{WorkflowError, WorkflowResult};
pub use result::{ActionResult, ExecutionCode, ExecutionResult};
pub use state::WorkflowState;
pub use subject::WorkflowSubject;
pub use transition::{TransitionVerdict, WorkflowTransition};
pub use workflow::Workflow;

// Re-exported so hosts and downstream crates use the same token type the
// engine's entry points take.
pub use tokio_util::sync::CancellationToken;
