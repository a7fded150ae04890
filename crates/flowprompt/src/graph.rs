//! Adjacency view of a flowchart.
//!
//! [`FlowGraph`] indexes a node and edge snapshot by node identifier so the
//! compiler can ask for outgoing edges and incoming neighbours in constant
//! time. It borrows the snapshot and never copies node or edge data.
//!
//! Capabilities:
//! - Outgoing edges per node, in edge creation order
//! - Incoming source nodes per node
//! - Orphan detection (no edges at all, not a start or end block)
//! - Flow numbering by breadth-first traversal from start blocks

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, trace};

use flowprompt_core::{
    identifier::NodeId,
    model::{Edge, Node, NodeShape},
};

use crate::error::FlowError;

/// Directed graph over borrowed nodes and edges.
///
/// Multiple edges between the same pair of nodes are kept; each one is a
/// separate branch.
#[derive(Debug)]
pub struct FlowGraph<'a> {
    nodes: &'a [Node],
    outgoing: HashMap<NodeId, Vec<&'a Edge>>,
    incoming: HashMap<NodeId, Vec<NodeId>>,
}

impl<'a> FlowGraph<'a> {
    /// Builds the adjacency maps.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::DanglingReference`] if an edge points at a node
    /// that is not in `nodes`.
    pub fn new(nodes: &'a [Node], edges: &'a [Edge]) -> Result<Self, FlowError> {
        let mut outgoing: HashMap<NodeId, Vec<&'a Edge>> =
            nodes.iter().map(|node| (node.id(), Vec::new())).collect();
        let mut incoming: HashMap<NodeId, Vec<NodeId>> =
            nodes.iter().map(|node| (node.id(), Vec::new())).collect();

        for edge in edges {
            let from = edge.source().node;
            let to = edge.target().node;
            for node in [from, to] {
                if !outgoing.contains_key(&node) {
                    return Err(FlowError::DanglingReference {
                        edge: edge.id(),
                        node,
                    });
                }
            }

            outgoing.entry(from).or_default().push(edge);
            incoming.entry(to).or_default().push(from);
        }

        debug!(nodes = nodes.len(), edges = edges.len(); "Built flow graph");
        Ok(Self {
            nodes,
            outgoing,
            incoming,
        })
    }

    /// Nodes in snapshot order.
    pub fn nodes(&self) -> &'a [Node] {
        self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&'a Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Edges leaving `id`, in creation order.
    pub fn outgoing(&self, id: NodeId) -> &[&'a Edge] {
        self.outgoing.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Source nodes of the edges arriving at `id`.
    pub fn incoming(&self, id: NodeId) -> &[NodeId] {
        self.incoming.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns true for an unconnected node that is neither a start nor an
    /// end block.
    pub fn is_orphan(&self, node: &Node) -> bool {
        !node.shape().is_terminal()
            && self.outgoing(node.id()).is_empty()
            && self.incoming(node.id()).is_empty()
    }

    /// All orphans in snapshot order.
    pub fn orphans(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.nodes.iter().filter(|node| self.is_orphan(node))
    }

    /// Numbers every node by flow order.
    ///
    /// Each start block, in snapshot order, seeds a breadth-first walk along
    /// outgoing edges; nodes get consecutive numbers from 1 as they are first
    /// reached. Nodes no walk reaches are numbered afterwards in snapshot
    /// order.
    pub fn numbering(&self) -> Numbering {
        let mut numbering = Numbering::default();
        let mut visited = HashSet::new();

        let starts = self
            .nodes
            .iter()
            .filter(|node| node.shape() == NodeShape::Start);
        for start in starts {
            let mut queue = VecDeque::from([start.id()]);
            while let Some(current) = queue.pop_front() {
                if !visited.insert(current) {
                    continue;
                }
                numbering.assign(current);
                trace!(node:% = current, number = numbering.len(); "Numbered node");

                for edge in self.outgoing(current) {
                    let next = edge.target().node;
                    if !visited.contains(&next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        for node in self.nodes {
            if !visited.contains(&node.id()) {
                numbering.assign(node.id());
            }
        }

        numbering
    }
}

/// Flow numbers assigned to nodes, starting at 1.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Numbering {
    numbers: HashMap<NodeId, usize>,
    order: Vec<NodeId>,
}

impl Numbering {
    fn assign(&mut self, id: NodeId) {
        self.order.push(id);
        self.numbers.insert(id, self.order.len());
    }

    /// Number of `id`, if it was numbered.
    pub fn number(&self, id: NodeId) -> Option<usize> {
        self.numbers.get(&id).copied()
    }

    /// Node identifiers in ascending number order.
    pub fn in_order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use flowprompt_core::{
        color::Color,
        geometry::{Bounds, Point, Size},
        identifier::EdgeId,
        model::{Anchor, Endpoint},
    };

    use super::*;

    fn node(id: u32, shape: NodeShape) -> Node {
        Node::new(
            NodeId::new(id),
            shape,
            Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(150.0, 70.0)),
            Color::default(),
            format!("n{id}"),
        )
    }

    fn edge(id: u32, from: u32, to: u32) -> Edge {
        Edge::new(
            EdgeId::new(id),
            Endpoint::new(NodeId::new(from), Anchor::Bottom),
            Endpoint::new(NodeId::new(to), Anchor::Top),
            "",
        )
    }

    fn numbers(numbering: &Numbering) -> Vec<u32> {
        numbering.in_order().iter().map(|id| id.get()).collect()
    }

    #[test]
    fn test_adjacency_keeps_creation_order() {
        let nodes = [
            node(0, NodeShape::Decision),
            node(1, NodeShape::Process),
            node(2, NodeShape::Process),
        ];
        let edges = [edge(0, 0, 2), edge(1, 0, 1), edge(2, 1, 2)];
        let graph = FlowGraph::new(&nodes, &edges).unwrap();

        let targets: Vec<u32> = graph
            .outgoing(NodeId::new(0))
            .iter()
            .map(|edge| edge.target().node.get())
            .collect();
        assert_eq!(targets, vec![2, 1]);
        assert_eq!(
            graph.incoming(NodeId::new(2)),
            &[NodeId::new(0), NodeId::new(1)]
        );
        assert!(graph.outgoing(NodeId::new(99)).is_empty());
    }

    #[test]
    fn test_dangling_edge() {
        let nodes = [node(0, NodeShape::Start)];
        let edges = [edge(4, 0, 5)];
        let err = FlowGraph::new(&nodes, &edges).unwrap_err();
        assert!(matches!(
            err,
            FlowError::DanglingReference { edge, node }
                if edge == EdgeId::new(4) && node == NodeId::new(5)
        ));
    }

    #[test]
    fn test_orphans_exclude_terminals() {
        let nodes = [
            node(0, NodeShape::Start),
            node(1, NodeShape::Process),
            node(2, NodeShape::End),
            node(3, NodeShape::Data),
            node(4, NodeShape::Process),
        ];
        let edges = [edge(0, 3, 4)];
        let graph = FlowGraph::new(&nodes, &edges).unwrap();

        let orphans: Vec<u32> = graph.orphans().map(|node| node.id().get()).collect();
        assert_eq!(orphans, vec![1]);
    }

    #[test]
    fn test_numbering_is_breadth_first() {
        // 0 -> 1 -> 3, 0 -> 2 -> 3; node 4 unreachable.
        let nodes = [
            node(4, NodeShape::Process),
            node(3, NodeShape::End),
            node(2, NodeShape::Process),
            node(1, NodeShape::Process),
            node(0, NodeShape::Start),
        ];
        let edges = [edge(0, 0, 1), edge(1, 0, 2), edge(2, 1, 3), edge(3, 2, 3)];
        let graph = FlowGraph::new(&nodes, &edges).unwrap();
        let numbering = graph.numbering();

        assert_eq!(numbers(&numbering), vec![0, 1, 2, 3, 4]);
        assert_eq!(numbering.number(NodeId::new(0)), Some(1));
        assert_eq!(numbering.number(NodeId::new(4)), Some(5));
    }

    #[test]
    fn test_numbering_multiple_starts_in_snapshot_order() {
        let nodes = [
            node(0, NodeShape::Process),
            node(1, NodeShape::Start),
            node(2, NodeShape::Start),
            node(3, NodeShape::End),
        ];
        let edges = [edge(0, 2, 0), edge(1, 1, 3)];
        let graph = FlowGraph::new(&nodes, &edges).unwrap();

        assert_eq!(numbers(&graph.numbering()), vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_numbering_survives_cycles() {
        let nodes = [
            node(0, NodeShape::Start),
            node(1, NodeShape::Process),
            node(2, NodeShape::Decision),
        ];
        let edges = [edge(0, 0, 1), edge(1, 1, 2), edge(2, 2, 1)];
        let graph = FlowGraph::new(&nodes, &edges).unwrap();

        let numbering = graph.numbering();
        assert_eq!(numbering.len(), 3);
        assert_eq!(numbers(&numbering), vec![0, 1, 2]);
    }

    #[test]
    fn test_numbering_without_start_uses_snapshot_order() {
        let nodes = [node(7, NodeShape::Process), node(2, NodeShape::Process)];
        let edges = [edge(0, 2, 7)];
        let graph = FlowGraph::new(&nodes, &edges).unwrap();
        assert_eq!(numbers(&graph.numbering()), vec![7, 2]);
    }
}
