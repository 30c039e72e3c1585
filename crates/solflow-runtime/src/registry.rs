use solflow_core::{Node, NodeError, NodePorts};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of node-type handlers, looked up by type key. Handlers are
/// stateless and shared; the only state they touch is the execution
/// context passed per dispatch.
pub struct NodeRegistry {
    handlers: HashMap<String, Arc<dyn Node>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn Node>) {
        let node_type = handler.node_type().to_string();
        tracing::debug!(%node_type, "registering node type");
        self.handlers.insert(node_type, handler);
    }

    /// Look up the handler for a node type. An unknown type is a dispatch
    /// error, never silently skipped.
    pub fn get(&self, node_type: &str) -> Result<Arc<dyn Node>, NodeError> {
        self.handlers
            .get(node_type)
            .cloned()
            .ok_or_else(|| NodeError::UnknownType(node_type.to_string()))
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.handlers.contains_key(node_type)
    }

    /// Declared ports for a node type, as the catalog surface for a UI and
    /// the resolver's declared-output fallback.
    pub fn ports(&self, node_type: &str) -> Option<NodePorts> {
        self.handlers.get(node_type).map(|h| h.ports())
    }

    pub fn node_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
