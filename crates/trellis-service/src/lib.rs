//! Name-based workflow execution for hosts
//!
//! Wraps the `trellis-engine` core behind a façade that resolves
//! workflow definitions by name: hosts register definitions once (or
//! supply their own [`WorkflowResolver`]), then start subjects and fire
//! transitions using nothing but strings. Also provides transition
//! introspection (descriptors and execution frames) so a client can
//! ask "what can this subject do next, and why not".
//!
//! # Key Concepts
//!
//! - **ExecutionService**: the façade; resolver + activity registry,
//!   shareable and clonable.
//! - **WorkflowResolver**: the name → definition seam;
//!   [`InMemoryWorkflowRegistry`] is the provided implementation.
//! - **TransitionDescriptor / ExecutionFrame**: serializable snapshots
//!   of a subject's available transitions with guard verdicts evaluated.

#![deny(unsafe_code)]

mod descriptor;
mod resolver;
mod service;

pub use descriptor::{ExecutionFrame, TransitionDescriptor};
pub use resolver::{InMemoryWorkflowRegistry, WorkflowResolver};
pub use service::ExecutionService;

// Hosts define workflows and implement subjects against engine types.
pub use trellis_engine as engine;
