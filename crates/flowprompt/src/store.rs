//! The diagram store.
//!
//! [`DiagramStore`] exclusively owns every [`Node`] and [`Edge`] of a
//! flowchart and keeps them consistent:
//!
//! - identifiers come from injectable [`IdGenerator`]s and are never reused
//!   until the store is cleared,
//! - every edge references two existing nodes; deleting a node cascades to
//!   its edges,
//! - node rectangles never shrink below what their caption needs,
//! - edge paths are recomputed whenever node geometry changes.
//!
//! The store also holds the current selection, which is cleared when the
//! selected item goes away.

use log::{debug, info, trace};

use flowprompt_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    identifier::{EdgeId, IdGenerator, NodeId, SequentialIds},
    model::{Edge, Endpoint, ItemRef, Node, NodeShape},
    route::{DEFAULT_STUB_LENGTH, attachment_points, route_edge},
    text::{FontMeasure, TextMeasure, TextStyle, fit_size, min_size},
};

use crate::error::FlowError;

/// Top-left corner of freshly created nodes.
pub const DEFAULT_NODE_POSITION: Point = Point::new(50.0, 50.0);

/// Owner of all nodes and edges of one flowchart.
///
/// # Examples
///
/// ```
/// use flowprompt::store::DiagramStore;
/// use flowprompt_core::{
///     model::{Anchor, Endpoint, NodeShape},
///     text::FixedAdvance,
/// };
///
/// let mut store = DiagramStore::new().with_text_measure(Box::new(FixedAdvance::new(8.0)));
/// let start = store.create_default_node(NodeShape::Start).unwrap().id();
/// let end = store.create_default_node(NodeShape::End).unwrap().id();
///
/// let edge = store
///     .create_edge(Endpoint::new(start, Anchor::Bottom), Endpoint::new(end, Anchor::Top))
///     .unwrap()
///     .expect("distinct nodes");
/// assert_eq!(edge.path().len(), 5);
///
/// store.delete_node(start).unwrap();
/// assert!(store.edges().is_empty());
/// ```
#[derive(Debug)]
pub struct DiagramStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selection: Option<ItemRef>,
    node_ids: Box<dyn IdGenerator>,
    edge_ids: Box<dyn IdGenerator>,
    measure: Box<dyn TextMeasure>,
    text_style: TextStyle,
    stub_length: f32,
}

impl Default for DiagramStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramStore {
    /// Creates an empty store with sequential identifiers and font-based
    /// caption measurement.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            selection: None,
            node_ids: Box::new(SequentialIds::default()),
            edge_ids: Box::new(SequentialIds::default()),
            measure: Box::new(FontMeasure::new()),
            text_style: TextStyle::default(),
            stub_length: DEFAULT_STUB_LENGTH,
        }
    }

    /// Replaces the identifier generators for nodes and edges.
    pub fn with_id_generators(
        mut self,
        node_ids: Box<dyn IdGenerator>,
        edge_ids: Box<dyn IdGenerator>,
    ) -> Self {
        self.node_ids = node_ids;
        self.edge_ids = edge_ids;
        self
    }

    /// Replaces the caption measurer.
    pub fn with_text_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn with_text_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    /// Sets how far connectors run straight out of their anchors.
    pub fn with_stub_length(mut self, stub_length: f32) -> Self {
        self.stub_length = stub_length;
        self
    }

    /// All nodes, in creation order (bottom-most first).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Value the next created node will get as its identifier.
    pub fn next_node_id(&self) -> u32 {
        self.node_ids.peek()
    }

    /// Value the next created edge will get as its identifier.
    pub fn next_edge_id(&self) -> u32 {
        self.edge_ids.peek()
    }

    pub fn text_style(&self) -> &TextStyle {
        &self.text_style
    }

    pub fn text_measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    pub fn stub_length(&self) -> f32 {
        self.stub_length
    }

    /// Appends a new node at the default position with a white fill.
    ///
    /// The requested size is grown if `text` needs more room. Edge paths are
    /// not touched since no edge can reference the new node yet.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::IdsExhausted`] if the node identifier sequence has
    /// run out; the store is unchanged.
    pub fn create_node(
        &mut self,
        shape: NodeShape,
        text: &str,
        size: Size,
    ) -> Result<&Node, FlowError> {
        let id = self
            .node_ids
            .next_id()
            .map(NodeId::new)
            .ok_or(FlowError::IdsExhausted("node"))?;
        let size = fit_size(text, &self.text_style, self.measure.as_ref(), size);
        let bounds = Bounds::new_from_top_left(DEFAULT_NODE_POSITION, size);

        info!(id:% = id, shape:% = shape; "Creating node");
        self.nodes.push(Node::new(id, shape, bounds, Color::default(), text));
        Ok(&self.nodes[self.nodes.len() - 1])
    }

    /// Appends a new node with the shape's default caption and size.
    pub fn create_default_node(&mut self, shape: NodeShape) -> Result<&Node, FlowError> {
        self.create_node(shape, shape.default_text(), shape.default_size())
    }

    /// Connects two node anchors with a new unlabeled edge.
    ///
    /// Returns `Ok(None)` without allocating an identifier when both ends are
    /// on the same node; self-loops are not drawn.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::DanglingReference`] if either node is missing and
    /// [`FlowError::IdsExhausted`] if the edge identifier sequence has run out.
    pub fn create_edge(
        &mut self,
        from: Endpoint,
        to: Endpoint,
    ) -> Result<Option<&Edge>, FlowError> {
        for endpoint in [from, to] {
            if self.node(endpoint.node).is_none() {
                return Err(FlowError::DanglingReference {
                    edge: EdgeId::new(self.edge_ids.peek()),
                    node: endpoint.node,
                });
            }
        }
        if from.node == to.node {
            debug!(node:% = from.node; "Ignoring self-loop");
            return Ok(None);
        }

        let id = self
            .edge_ids
            .next_id()
            .map(EdgeId::new)
            .ok_or(FlowError::IdsExhausted("edge"))?;
        let mut edge = Edge::new(id, from, to, "");
        if let Some(path) = self.route(&edge) {
            edge.set_path(path);
        }

        info!(id:% = id, from:% = from.node, to:% = to.node; "Creating edge");
        self.edges.push(edge);
        Ok(self.edges.last())
    }

    /// Removes a node together with every edge attached to it.
    pub fn delete_node(&mut self, id: NodeId) -> Result<(), FlowError> {
        let index = self.node_index(id)?;
        self.nodes.remove(index);

        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        info!(id:% = id, removed_edges = before - self.edges.len(); "Deleted node");

        self.retain_selection();
        self.reroute_all();
        Ok(())
    }

    /// Removes a single edge.
    pub fn delete_edge(&mut self, id: EdgeId) -> Result<(), FlowError> {
        let index = self.edge_index(id)?;
        self.edges.remove(index);
        info!(id:% = id; "Deleted edge");

        self.retain_selection();
        Ok(())
    }

    /// Removes whichever item `item` refers to.
    pub fn delete_item(&mut self, item: ItemRef) -> Result<(), FlowError> {
        match item {
            ItemRef::Node(id) => self.delete_node(id),
            ItemRef::Edge(id) => self.delete_edge(id),
        }
    }

    /// Moves a node by an offset.
    pub fn move_node(&mut self, id: NodeId, dx: f32, dy: f32) -> Result<(), FlowError> {
        let position = self.node_ref(id)?.position();
        self.set_node_position(id, position.add_point(Point::new(dx, dy)))
    }

    /// Moves a node so its top-left corner is at `top_left`.
    pub fn set_node_position(&mut self, id: NodeId, top_left: Point) -> Result<(), FlowError> {
        let index = self.node_index(id)?;
        self.nodes[index].set_position(top_left);
        trace!(id:% = id, x = top_left.x(), y = top_left.y(); "Moved node");

        self.reroute_all();
        Ok(())
    }

    /// Resizes a node, clamped so it still contains its caption.
    pub fn resize_node(&mut self, id: NodeId, size: Size) -> Result<(), FlowError> {
        let index = self.node_index(id)?;
        let minimum = min_size(
            self.nodes[index].text(),
            &self.text_style,
            self.measure.as_ref(),
        );
        self.nodes[index].set_size(size.max(minimum));

        self.reroute_all();
        Ok(())
    }

    /// Changes a node's fill color.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidColor`] if `color` is not a CSS color.
    pub fn recolor_node(&mut self, id: NodeId, color: &str) -> Result<(), FlowError> {
        let index = self.node_index(id)?;
        let color = Color::new(color).map_err(FlowError::InvalidColor)?;
        self.nodes[index].set_color(color);
        debug!(id:% = id, color:% = color; "Recolored node");
        Ok(())
    }

    /// Replaces a node's caption and grows the node to fit it.
    pub fn retext_node(&mut self, id: NodeId, text: &str) -> Result<(), FlowError> {
        let index = self.node_index(id)?;
        let node = &mut self.nodes[index];
        let size = fit_size(text, &self.text_style, self.measure.as_ref(), node.size());
        let grown = size != node.size();
        node.set_text(text);
        node.set_size(size);
        debug!(id:% = id, grown = grown; "Changed node text");

        if grown {
            self.reroute_all();
        }
        Ok(())
    }

    /// Replaces an edge's label; an empty string removes the label.
    pub fn retext_edge(&mut self, id: EdgeId, text: &str) -> Result<(), FlowError> {
        let index = self.edge_index(id)?;
        self.edges[index].set_text(text);
        debug!(id:% = id; "Changed edge label");
        Ok(())
    }

    /// Focuses a node or edge.
    pub fn select(&mut self, item: ItemRef) -> Result<(), FlowError> {
        match item {
            ItemRef::Node(id) => {
                self.node_ref(id)?;
            }
            ItemRef::Edge(id) => {
                self.edge_index(id)?;
            }
        }
        self.selection = Some(item);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// The focused item, if any.
    pub fn selection(&self) -> Option<ItemRef> {
        self.selection
    }

    /// Removes everything and restarts both identifier sequences at zero.
    pub fn clear(&mut self) {
        info!(nodes = self.nodes.len(), edges = self.edges.len(); "Clearing diagram");
        self.nodes.clear();
        self.edges.clear();
        self.selection = None;
        self.node_ids.reset(0);
        self.edge_ids.reset(0);
    }

    /// Recomputes the path of every edge from current node geometry.
    pub fn reroute_all(&mut self) {
        let paths: Vec<Option<Vec<Point>>> = self.edges.iter().map(|edge| self.route(edge)).collect();
        for (edge, path) in self.edges.iter_mut().zip(paths) {
            if let Some(path) = path {
                edge.set_path(path);
            }
        }
        trace!(edges = self.edges.len(); "Rerouted edges");
    }

    /// Swaps in a complete, already validated state.
    pub(crate) fn replace_contents(
        &mut self,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        next_node_id: u32,
        next_edge_id: u32,
    ) {
        self.nodes = nodes;
        self.edges = edges;
        self.selection = None;
        self.node_ids.reset(next_node_id);
        self.edge_ids.reset(next_edge_id);
        self.reroute_all();
    }

    /// Path for an edge, or `None` if an endpoint node is missing.
    fn route(&self, edge: &Edge) -> Option<Vec<Point>> {
        let from = edge.source();
        let to = edge.target();
        let from_point = attachment_points(self.node(from.node)?.bounds()).get(from.anchor);
        let to_point = attachment_points(self.node(to.node)?.bounds()).get(to.anchor);
        Some(route_edge(
            from_point,
            from.anchor,
            to_point,
            to.anchor,
            self.stub_length,
        ))
    }

    fn retain_selection(&mut self) {
        let still_exists = match self.selection {
            Some(ItemRef::Node(id)) => self.node(id).is_some(),
            Some(ItemRef::Edge(id)) => self.edge(id).is_some(),
            None => true,
        };
        if !still_exists {
            self.selection = None;
        }
    }

    fn node_ref(&self, id: NodeId) -> Result<&Node, FlowError> {
        self.node(id).ok_or(FlowError::UnknownNode(id))
    }

    fn node_index(&self, id: NodeId) -> Result<usize, FlowError> {
        self.nodes
            .iter()
            .position(|node| node.id() == id)
            .ok_or(FlowError::UnknownNode(id))
    }

    fn edge_index(&self, id: EdgeId) -> Result<usize, FlowError> {
        self.edges
            .iter()
            .position(|edge| edge.id() == id)
            .ok_or(FlowError::UnknownEdge(id))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use flowprompt_core::{model::Anchor, text::FixedAdvance};

    use super::*;

    fn store() -> DiagramStore {
        DiagramStore::new().with_text_measure(Box::new(FixedAdvance::new(10.0)))
    }

    fn connect(store: &mut DiagramStore, from: NodeId, to: NodeId) -> EdgeId {
        store
            .create_edge(
                Endpoint::new(from, Anchor::Bottom),
                Endpoint::new(to, Anchor::Top),
            )
            .expect("both nodes exist")
            .expect("not a self-loop")
            .id()
    }

    #[test]
    fn test_create_node_defaults() {
        let mut store = store();
        let node = store.create_default_node(NodeShape::Decision).unwrap();

        assert_eq!(node.id(), NodeId::new(0));
        assert_eq!(node.position(), Point::new(50.0, 50.0));
        assert_eq!(node.size(), Size::new(160.0, 80.0));
        assert_eq!(node.color().to_hex(), "#ffffff");
        assert_eq!(node.text(), "Condition");
        assert_eq!(store.next_node_id(), 1);
    }

    #[test]
    fn test_create_node_fits_text() {
        let mut store = store();
        let node = store
            .create_node(NodeShape::Process, &"x".repeat(30), Size::new(150.0, 70.0))
            .unwrap();
        assert_approx_eq!(f32, node.size().width(), 340.0);
        assert_approx_eq!(f32, node.size().height(), 70.0);
    }

    #[test]
    fn test_create_edge_routes_immediately() {
        let mut store = store();
        let a = store.create_default_node(NodeShape::Start).unwrap().id();
        let b = store.create_default_node(NodeShape::End).unwrap().id();
        store.move_node(b, 0.0, 200.0).unwrap();

        let edge_id = connect(&mut store, a, b);
        let edge = store.edge(edge_id).unwrap();
        assert_eq!(edge.text(), "");
        assert_eq!(edge.path().first(), Some(&Point::new(125.0, 100.0)));
        assert_eq!(edge.path().last(), Some(&Point::new(125.0, 250.0)));
    }

    #[test]
    fn test_create_edge_self_loop_is_ignored() {
        let mut store = store();
        let a = store.create_default_node(NodeShape::Process).unwrap().id();

        let result = store
            .create_edge(Endpoint::new(a, Anchor::Left), Endpoint::new(a, Anchor::Right))
            .unwrap();
        assert!(result.is_none());
        assert!(store.edges().is_empty());
        assert_eq!(store.next_edge_id(), 0);
    }

    #[test]
    fn test_create_edge_unknown_node() {
        let mut store = store();
        let a = store.create_default_node(NodeShape::Process).unwrap().id();

        let err = store
            .create_edge(
                Endpoint::new(a, Anchor::Right),
                Endpoint::new(NodeId::new(42), Anchor::Left),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            FlowError::DanglingReference { node, .. } if node == NodeId::new(42)
        ));
    }

    #[test]
    fn test_delete_node_cascades_and_clears_selection() {
        let mut store = store();
        let a = store.create_default_node(NodeShape::Start).unwrap().id();
        let b = store.create_default_node(NodeShape::Process).unwrap().id();
        let c = store.create_default_node(NodeShape::End).unwrap().id();
        let ab = connect(&mut store, a, b);
        let bc = connect(&mut store, b, c);
        let ac = connect(&mut store, a, c);

        store.select(ItemRef::Edge(bc)).unwrap();
        store.delete_node(b).unwrap();

        let remaining: Vec<EdgeId> = store.edges().iter().map(Edge::id).collect();
        assert_eq!(remaining, vec![ac]);
        assert!(store.edge(ab).is_none());
        assert_eq!(store.selection(), None);
        assert!(store.edges().iter().all(|edge| !edge.touches(b)));
    }

    #[test]
    fn test_delete_edge_keeps_unrelated_selection() {
        let mut store = store();
        let a = store.create_default_node(NodeShape::Start).unwrap().id();
        let b = store.create_default_node(NodeShape::End).unwrap().id();
        let edge = connect(&mut store, a, b);

        store.select(ItemRef::Node(a)).unwrap();
        store.delete_edge(edge).unwrap();
        assert_eq!(store.selection(), Some(ItemRef::Node(a)));
        assert!(matches!(
            store.delete_edge(edge),
            Err(FlowError::UnknownEdge(id)) if id == edge
        ));
    }

    #[test]
    fn test_moving_a_node_reroutes_its_edges() {
        let mut store = store();
        let a = store.create_default_node(NodeShape::Start).unwrap().id();
        let b = store.create_default_node(NodeShape::End).unwrap().id();
        store.set_node_position(b, Point::new(300.0, 300.0)).unwrap();
        let edge = connect(&mut store, a, b);

        store.move_node(a, 10.0, 5.0).unwrap();
        let path = store.edge(edge).unwrap().path().to_vec();
        assert_eq!(path[0], Point::new(135.0, 105.0));
        assert_eq!(path[4], Point::new(375.0, 300.0));
    }

    #[test]
    fn test_resize_is_clamped_to_text() {
        let mut store = store();
        let a = store
            .create_node(NodeShape::Process, "two\nlines", Size::new(150.0, 70.0))
            .unwrap()
            .id();

        store.resize_node(a, Size::new(10.0, 10.0)).unwrap();
        // "lines" is 5 * 10 wide, plus 40; two lines need 2 * 20 + 20.
        assert_eq!(store.node(a).unwrap().size(), Size::new(90.0, 60.0));

        store.resize_node(a, Size::new(400.0, 200.0)).unwrap();
        assert_eq!(store.node(a).unwrap().size(), Size::new(400.0, 200.0));
    }

    #[test]
    fn test_retext_node_grows_but_never_shrinks() {
        let mut store = store();
        let a = store.create_default_node(NodeShape::Process).unwrap().id();

        store.retext_node(a, "one\ntwo\nthree\nfour").unwrap();
        assert_approx_eq!(f32, store.node(a).unwrap().size().height(), 100.0);

        store.retext_node(a, "x").unwrap();
        assert_approx_eq!(f32, store.node(a).unwrap().size().height(), 100.0);
        assert_eq!(store.node(a).unwrap().text(), "x");
    }

    #[test]
    fn test_recolor_node() {
        let mut store = store();
        let a = store.create_default_node(NodeShape::Data).unwrap().id();

        store.recolor_node(a, "#FFADAD").unwrap();
        assert_eq!(store.node(a).unwrap().color().to_hex(), "#ffadad");
        assert!(matches!(
            store.recolor_node(a, "mauve-ish"),
            Err(FlowError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let mut store = store();
        assert!(matches!(
            store.move_node(NodeId::new(3), 1.0, 1.0),
            Err(FlowError::UnknownNode(_))
        ));
        assert!(matches!(
            store.retext_edge(EdgeId::new(3), "yes"),
            Err(FlowError::UnknownEdge(_))
        ));
        assert!(store.select(ItemRef::Node(NodeId::new(0))).is_err());
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut store = store();
        let a = store.create_default_node(NodeShape::Start).unwrap().id();
        let b = store.create_default_node(NodeShape::End).unwrap().id();
        connect(&mut store, a, b);
        store.select(ItemRef::Node(a)).unwrap();

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.selection(), None);
        assert_eq!(store.next_node_id(), 0);
        assert_eq!(store.next_edge_id(), 0);
        assert_eq!(
            store.create_default_node(NodeShape::Start).unwrap().id(),
            NodeId::new(0)
        );
    }

    #[test]
    fn test_custom_id_generators() {
        let mut store = store().with_id_generators(
            Box::new(SequentialIds::starting_at(100)),
            Box::new(SequentialIds::starting_at(500)),
        );
        let a = store.create_default_node(NodeShape::Start).unwrap().id();
        let b = store.create_default_node(NodeShape::End).unwrap().id();
        assert_eq!(a, NodeId::new(100));
        assert_eq!(connect(&mut store, a, b), EdgeId::new(500));
    }

    #[test]
    fn test_exhausted_ids_are_reported() {
        let mut store = store().with_id_generators(
            Box::new(SequentialIds::starting_at(u32::MAX - 2)),
            Box::new(SequentialIds::starting_at(u32::MAX)),
        );
        let a = store.create_default_node(NodeShape::Start).unwrap().id();
        let b = store.create_default_node(NodeShape::End).unwrap().id();
        assert_eq!(b, NodeId::new(u32::MAX - 1));
        assert!(matches!(
            store.create_default_node(NodeShape::Process),
            Err(FlowError::IdsExhausted("node"))
        ));
        assert_eq!(store.nodes().len(), 2);

        assert!(matches!(
            store.create_edge(
                Endpoint::new(a, Anchor::Bottom),
                Endpoint::new(b, Anchor::Top),
            ),
            Err(FlowError::IdsExhausted("edge"))
        ));
        assert!(store.edges().is_empty());
    }

    proptest! {
        #[test]
        fn prop_node_always_contains_its_text(
            text in "[a-z ]{0,40}(\n[a-z ]{0,40}){0,5}",
            width in 0.0f32..400.0,
            height in 0.0f32..200.0,
        ) {
            let mut store = store();
            let id = store.create_default_node(NodeShape::Process).unwrap().id();
            store.retext_node(id, &text).unwrap();
            store.resize_node(id, Size::new(width, height)).unwrap();

            let node = store.node(id).unwrap();
            let needed = min_size(node.text(), store.text_style(), store.text_measure());
            prop_assert!(node.size().width() >= needed.width());
            prop_assert!(node.size().height() >= needed.height());
        }
    }
}
