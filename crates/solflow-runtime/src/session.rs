//! Per-run state: the result store and per-node runtime states. One
//! session is constructed per execution and passed by reference through
//! the run loop, so concurrent or test runs never share hidden state.

use solflow_core::{Graph, NodeId, RunId, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// A completed node's recorded outputs, keyed by output port id.
pub type NodeOutputs = HashMap<String, Value>;

/// Runtime state of one node, as a UI would render it. `Pending` after a
/// halted run means "never reached", distinct from `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRunState {
    Pending,
    Executing,
    Succeeded,
    Failed(String),
}

/// How a run ended when it was not aborted by an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Stopped,
}

pub struct RunSession {
    run_id: RunId,
    results: HashMap<NodeId, NodeOutputs>,
    states: HashMap<NodeId, NodeRunState>,
    current: Option<NodeId>,
}

impl RunSession {
    pub fn new(graph: &Graph) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            results: HashMap::new(),
            states: graph
                .nodes
                .iter()
                .map(|n| (n.id.clone(), NodeRunState::Pending))
                .collect(),
            current: None,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Recorded outputs for a node. Present iff the node succeeded.
    pub fn result(&self, node_id: &str) -> Option<&NodeOutputs> {
        self.results.get(node_id)
    }

    pub fn results(&self) -> &HashMap<NodeId, NodeOutputs> {
        &self.results
    }

    pub fn state(&self, node_id: &str) -> Option<&NodeRunState> {
        self.states.get(node_id)
    }

    /// The node currently dispatching, if any.
    pub fn current_node(&self) -> Option<&NodeId> {
        self.current.as_ref()
    }

    pub(crate) fn mark_executing(&mut self, node_id: &str) {
        self.states
            .insert(node_id.to_string(), NodeRunState::Executing);
        self.current = Some(node_id.to_string());
    }

    pub(crate) fn record_success(&mut self, node_id: &str, outputs: NodeOutputs) {
        self.results.insert(node_id.to_string(), outputs);
        self.states
            .insert(node_id.to_string(), NodeRunState::Succeeded);
        self.current = None;
    }

    pub(crate) fn record_failure(&mut self, node_id: &str, error: String) {
        self.states
            .insert(node_id.to_string(), NodeRunState::Failed(error));
        self.current = None;
    }
}
