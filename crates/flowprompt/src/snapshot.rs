//! Persisted flowchart format.
//!
//! A saved flowchart is a JSON object with four required fields:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": 0, "type": "node", "x": 50, "y": 50, "width": 150, "height": 50,
//!       "color": "#ffffff", "text": "Start", "shape": "start" }
//!   ],
//!   "edges": [
//!     { "id": 0, "type": "edge", "from": 0, "to": 1,
//!       "fromAnchor": "bottom", "toAnchor": "top", "text": "" }
//!   ],
//!   "nodeIdCounter": 2,
//!   "edgeIdCounter": 1
//! }
//! ```
//!
//! Edge paths are derived data: they are never written, and any `path`
//! field found on input is ignored.
//!
//! Loading is all-or-nothing. [`Snapshot::from_json`] parses the document,
//! [`DiagramStore::restore`] validates it and only then replaces the store's
//! contents.

use std::collections::HashSet;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use flowprompt_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    identifier::{EdgeId, NodeId},
    model::{Anchor, Edge, Endpoint, Node, NodeShape},
    text::fit_size,
};

use crate::{error::FlowError, store::DiagramStore};

/// Record type tag of a persisted node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeTag {
    #[default]
    Node,
}

/// Record type tag of a persisted edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeTag {
    #[default]
    Edge,
}

/// A persisted node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type", default)]
    pub tag: NodeTag,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub text: String,
    pub shape: NodeShape,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id(),
            tag: NodeTag::Node,
            x: node.position().x(),
            y: node.position().y(),
            width: node.size().width(),
            height: node.size().height(),
            color: node.color(),
            text: node.text().to_string(),
            shape: node.shape(),
        }
    }
}

impl NodeRecord {
    fn into_node(self) -> Node {
        let bounds = Bounds::new_from_top_left(
            Point::new(self.x, self.y),
            Size::new(self.width, self.height),
        );
        Node::new(self.id, self.shape, bounds, self.color, self.text)
    }
}

/// A persisted edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: EdgeId,
    #[serde(rename = "type", default)]
    pub tag: EdgeTag,
    pub from: NodeId,
    pub to: NodeId,
    pub from_anchor: Anchor,
    pub to_anchor: Anchor,
    #[serde(default)]
    pub text: String,
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id(),
            tag: EdgeTag::Edge,
            from: edge.source().node,
            to: edge.target().node,
            from_anchor: edge.source().anchor,
            to_anchor: edge.target().anchor,
            text: edge.text().to_string(),
        }
    }
}

impl EdgeRecord {
    fn into_edge(self) -> Edge {
        Edge::new(
            self.id,
            Endpoint::new(self.from, self.from_anchor),
            Endpoint::new(self.to, self.to_anchor),
            self.text,
        )
    }
}

/// Complete persisted state of a flowchart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub node_id_counter: u32,
    pub edge_id_counter: u32,
}

impl Snapshot {
    /// Parses a saved flowchart.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidFormat`] if the text is not JSON, if any
    /// of the four top-level fields is missing or `null`, or if a record is
    /// malformed.
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes with two-space indentation.
    pub fn to_json(&self) -> Result<String, FlowError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks referential integrity.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidFormat`] for duplicate node or edge ids and
    /// for edges whose endpoints are not among the snapshot's nodes.
    pub fn validate(&self) -> Result<(), FlowError> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id) {
                return Err(FlowError::InvalidFormat(format!("duplicate {}", node.id)));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id) {
                return Err(FlowError::InvalidFormat(format!("duplicate {}", edge.id)));
            }
            for endpoint in [edge.from, edge.to] {
                if !node_ids.contains(&endpoint) {
                    return Err(FlowError::InvalidFormat(
                        FlowError::DanglingReference {
                            edge: edge.id,
                            node: endpoint,
                        }
                        .to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Counters that will not hand out an identifier already in use.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidFormat`] if an id is `u32::MAX`, leaving no
    /// value for the counter to move past it.
    fn repaired_counters(&self) -> Result<(u32, u32), FlowError> {
        let next_node = successor_of_max(self.nodes.iter().map(|node| node.id.get()))?;
        let next_edge = successor_of_max(self.edges.iter().map(|edge| edge.id.get()))?;

        let node_counter = repair_counter("nodeIdCounter", self.node_id_counter, next_node);
        let edge_counter = repair_counter("edgeIdCounter", self.edge_id_counter, next_edge);
        Ok((node_counter, edge_counter))
    }
}

fn successor_of_max(ids: impl Iterator<Item = u32>) -> Result<Option<u32>, FlowError> {
    ids.max()
        .map(|id| {
            id.checked_add(1)
                .ok_or_else(|| FlowError::InvalidFormat("id counter exhausted".to_string()))
        })
        .transpose()
}

fn repair_counter(field: &str, counter: u32, minimum: Option<u32>) -> u32 {
    match minimum {
        Some(minimum) if counter < minimum => {
            warn!(field, counter, raised_to = minimum; "Counter below an existing id");
            minimum
        }
        _ => counter,
    }
}

impl DiagramStore {
    /// Captures the persisted state of the store.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes().iter().map(NodeRecord::from).collect(),
            edges: self.edges().iter().map(EdgeRecord::from).collect(),
            node_id_counter: self.next_node_id(),
            edge_id_counter: self.next_edge_id(),
        }
    }

    /// Replaces the whole store with a saved state.
    ///
    /// The selection is cleared, nodes too small for their caption are grown
    /// and all edge paths are recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidFormat`] if the snapshot fails
    /// [`Snapshot::validate`] or uses the largest possible id; the store is
    /// left untouched in that case.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), FlowError> {
        let (next_node_id, next_edge_id) = match snapshot
            .validate()
            .and_then(|()| snapshot.repaired_counters())
        {
            Ok(counters) => counters,
            Err(err) => {
                warn!(err:%; "Rejected flowchart");
                return Err(err);
            }
        };

        let nodes: Vec<Node> = snapshot
            .nodes
            .into_iter()
            .map(|record| {
                let mut node = record.into_node();
                let size = fit_size(node.text(), self.text_style(), self.text_measure(), node.size());
                node.set_size(size);
                node
            })
            .collect();
        let edges: Vec<Edge> = snapshot.edges.into_iter().map(EdgeRecord::into_edge).collect();

        info!(nodes = nodes.len(), edges = edges.len(); "Loaded flowchart");
        self.replace_contents(nodes, edges, next_node_id, next_edge_id);
        Ok(())
    }

    /// Serializes the store to the persisted JSON format.
    pub fn to_json(&self) -> Result<String, FlowError> {
        self.snapshot().to_json()
    }

    /// Replaces the store with a flowchart parsed from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidFormat`] for malformed or inconsistent
    /// input; the store is left untouched.
    pub fn load_json(&mut self, json: &str) -> Result<(), FlowError> {
        let snapshot = Snapshot::from_json(json).inspect_err(|err| {
            warn!(err:%; "Rejected flowchart");
        })?;
        self.restore(snapshot)
    }
}
