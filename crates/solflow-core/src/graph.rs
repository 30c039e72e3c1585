use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque node identifier, unique within a graph, assigned by the editor.
pub type NodeId = String;

/// An authored node/edge graph, handed to the engine as an immutable
/// snapshot for the duration of one run. This is also the interchange
/// shape consumed from and produced for external persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    pub fn connect(
        &mut self,
        source: impl Into<NodeId>,
        source_handle: impl Into<String>,
        target: impl Into<NodeId>,
        target_handle: impl Into<String>,
    ) {
        let source = source.into();
        let target = target.into();
        let id = format!("e{}-{}", self.edges.len(), self.edges.len() + 1);
        self.edges.push(GraphEdge {
            id,
            source,
            source_handle: Some(source_handle.into()),
            target,
            target_handle: Some(target_handle.into()),
        });
    }

    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One typed unit of work. `values` holds the literal configuration the
/// properties panel wrote; the engine reads it, never writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub values: HashMap<String, serde_json::Value>,
    /// Editor canvas coordinates. Round-tripped, never read by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl GraphNode {
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            values: HashMap::new(),
            position: None,
        }
    }

    pub fn with_value(mut self, port: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(port.into(), value);
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Position { x, y });
        self
    }
}

/// A directed binding from one node's output port to another node's
/// input port. Handles may be absent on hand-written graphs; the
/// resolver deals with that leniently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(default)]
    pub id: String,
    pub source: NodeId,
    #[serde(rename = "sourceHandle", default)]
    pub source_handle: Option<String>,
    pub target: NodeId,
    #[serde(rename = "targetHandle", default)]
    pub target_handle: Option<String>,
}

/// Node position in the visual editor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interchange_round_trip() {
        let json = r#"{
            "nodes": [
                {"id": "n1", "type": "input-number", "position": {"x": 10.0, "y": 20.0}, "values": {"value": 3}},
                {"id": "n2", "type": "math-add"}
            ],
            "edges": [
                {"id": "e1", "source": "n1", "sourceHandle": "value", "target": "n2", "targetHandle": "a"}
            ]
        }"#;
        let graph = Graph::from_json(json).expect("parses");
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges[0].source_handle.as_deref(), Some("value"));
        assert_eq!(graph.nodes[0].values["value"], serde_json::json!(3));

        let round = Graph::from_json(&graph.to_json().unwrap()).unwrap();
        assert_eq!(round.edges[0].target_handle.as_deref(), Some("a"));
        assert!(round.nodes[1].position.is_none());
    }

    #[test]
    fn builder_connects_nodes() {
        let mut graph = Graph::new();
        let a = graph.add_node(GraphNode::new("a", "input-number"));
        let b = graph.add_node(GraphNode::new("b", "output-display"));
        graph.connect(a, "value", b, "value");
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.find_node("b").unwrap().node_type, "output-display");
    }
}
