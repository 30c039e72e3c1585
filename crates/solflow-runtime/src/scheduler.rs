//! Execution-order computation via Kahn's algorithm.
//!
//! Single O(V+E) pass, detects cycles as a side effect, and yields a stable
//! order: the work queue is seeded in node-array order and drained FIFO, so
//! equal-in-degree candidates keep their declared position and re-running
//! the same graph always produces the same sequence.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use solflow_core::{Graph, GraphError, NodeId};
use std::collections::{HashMap, VecDeque};

/// Compute the linear execution order for `graph`.
///
/// Fails with [`GraphError::Cycle`] when no valid total order exists:
/// either a cycle, or nodes unreachable from any in-degree-0 root because
/// of a cycle elsewhere. The error carries the un-ordered node ids; no
/// partial execution is attempted.
pub fn execution_order(graph: &Graph) -> Result<Vec<NodeId>, GraphError> {
    let mut dag: DiGraph<NodeId, ()> =
        DiGraph::with_capacity(graph.nodes.len(), graph.edges.len());
    let mut index_of: HashMap<&str, NodeIndex> = HashMap::with_capacity(graph.nodes.len());

    for node in &graph.nodes {
        if index_of.contains_key(node.id.as_str()) {
            return Err(GraphError::DuplicateNode(node.id.clone()));
        }
        let ix = dag.add_node(node.id.clone());
        index_of.insert(node.id.as_str(), ix);
    }

    for edge in &graph.edges {
        let source = *index_of
            .get(edge.source.as_str())
            .ok_or_else(|| GraphError::UnknownNode(edge.source.clone()))?;
        let target = *index_of
            .get(edge.target.as_str())
            .ok_or_else(|| GraphError::UnknownNode(edge.target.clone()))?;
        dag.add_edge(source, target, ());
    }

    let mut in_degree: Vec<usize> = dag
        .node_indices()
        .map(|ix| dag.neighbors_directed(ix, Direction::Incoming).count())
        .collect();

    let mut queue: VecDeque<NodeIndex> = dag
        .node_indices()
        .filter(|ix| in_degree[ix.index()] == 0)
        .collect();

    let mut order: Vec<NodeId> = Vec::with_capacity(graph.nodes.len());
    while let Some(ix) = queue.pop_front() {
        order.push(dag[ix].clone());

        // neighbors() walks the adjacency list most-recent-first; reverse
        // to decrement successors in edge declaration order.
        let mut successors: Vec<NodeIndex> = dag.neighbors(ix).collect();
        successors.reverse();
        for succ in successors {
            let deg = &mut in_degree[succ.index()];
            *deg -= 1;
            if *deg == 0 {
                queue.push_back(succ);
            }
        }
    }

    if order.len() != graph.nodes.len() {
        let unordered: Vec<NodeId> = graph
            .nodes
            .iter()
            .map(|n| n.id.clone())
            .filter(|id| !order.contains(id))
            .collect();
        return Err(GraphError::Cycle { unordered });
    }

    Ok(order)
}
