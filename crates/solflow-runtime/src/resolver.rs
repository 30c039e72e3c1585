//! Input resolution: merge values flowing in over edges from recorded
//! upstream outputs with the node's own literal configuration.

use crate::registry::NodeRegistry;
use crate::session::NodeOutputs;
use solflow_core::{Graph, GraphNode, NodeError, NodeId, Value};
use std::collections::HashMap;

/// Build the concrete input map for `node`.
///
/// For every inbound edge whose source already has a recorded result, the
/// named source output is bound to the edge's target port. Key presence
/// decides, so an explicit null output still binds. When the named handle
/// is absent on the source result, loose mode falls back to the source
/// type's first declared output present on the result; strict mode fails
/// with [`NodeError::UnresolvedInput`] instead.
///
/// The node's literal `values` are merged on top afterwards, so a manually
/// configured value always wins over an inbound wire for the same port.
/// A node with no inbound edges resolves to exactly its literal values.
pub fn resolve_inputs(
    node: &GraphNode,
    graph: &Graph,
    registry: &NodeRegistry,
    results: &HashMap<NodeId, NodeOutputs>,
    strict: bool,
) -> Result<HashMap<String, Value>, NodeError> {
    let mut inputs: HashMap<String, Value> = HashMap::new();

    for edge in graph.edges.iter().filter(|e| e.target == node.id) {
        let Some(target_port) = edge.target_handle.as_deref() else {
            continue;
        };
        let Some(source_outputs) = results.get(&edge.source) else {
            continue;
        };

        let named = edge
            .source_handle
            .as_deref()
            .and_then(|handle| source_outputs.get(handle));
        if let Some(value) = named {
            inputs.insert(target_port.to_string(), value.clone());
            continue;
        }

        if strict {
            return Err(NodeError::UnresolvedInput {
                port: target_port.to_string(),
                handle: edge.source_handle.clone().unwrap_or_default(),
            });
        }

        // Loose fallback for mismatched handles: bind the source's first
        // declared output that actually exists on the result.
        let declared = graph
            .find_node(&edge.source)
            .and_then(|source| registry.ports(&source.node_type))
            .map(|ports| ports.outputs)
            .unwrap_or_default();
        if let Some(value) = declared.iter().find_map(|port| source_outputs.get(&port.id)) {
            inputs.insert(target_port.to_string(), value.clone());
        }
    }

    for (port, literal) in &node.values {
        inputs.insert(port.clone(), Value::from(literal.clone()));
    }

    Ok(inputs)
}
