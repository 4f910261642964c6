//! Workflow resolution: the name → definition seam
//!
//! The service only ever asks for workflows by name; where they live is
//! the host's business. [`InMemoryWorkflowRegistry`] is the provided
//! implementation for tests, tools, and hosts that load definitions up
//! front.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use trellis_engine::{Workflow, WorkflowError, WorkflowResult};

/// Name-based workflow lookup.
#[async_trait]
pub trait WorkflowResolver: Send + Sync {
    /// Resolve a workflow by its full name; `None` when unknown.
    async fn resolve(&self, name: &str) -> Option<Arc<Workflow>>;
}

/// Registry of workflow definitions held in memory.
///
/// Definitions are treated as immutable once registered; re-registering
/// a name replaces the whole definition.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowRegistry {
    workflows: RwLock<HashMap<String, Arc<Workflow>>>,
}

impl InMemoryWorkflowRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow definition, keyed by its full name.
    pub async fn register(&self, workflow: Workflow) {
        let name = workflow.full_name.clone();
        self.workflows
            .write()
            .await
            .insert(name.clone(), Arc::new(workflow));
        tracing::info!(workflow = %name, "Workflow definition registered");
    }

    /// Parse a JSON workflow document and register it. Returns the
    /// registered workflow's full name.
    pub async fn register_json(&self, json: &str) -> WorkflowResult<String> {
        let workflow: Workflow = serde_json::from_str(json)
            .map_err(|err| WorkflowError::InvalidDefinition(err.to_string()))?;
        let name = workflow.full_name.clone();
        self.register(workflow).await;
        Ok(name)
    }

    /// Names of all registered workflows, sorted
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workflows.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl WorkflowResolver for InMemoryWorkflowRegistry {
    async fn resolve(&self, name: &str) -> Option<Arc<Workflow>> {
        self.workflows.read().await.get(name).cloned()
    }
}
