//! Flowchart model types.
//!
//! These are the records the diagram store owns: [`Node`] blocks and the
//! [`Edge`] connectors between their [`Anchor`]s. [`ItemRef`] names either
//! kind of item without borrowing it, which is what selection and pointer
//! hit-testing hand around.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    color::Color,
    geometry::{Bounds, Point, Size},
    identifier::{EdgeId, NodeId},
};

/// Error returned when parsing a shape or anchor keyword fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownKeyword {
    kind: &'static str,
    value: String,
}

/// The block kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Start,
    End,
    Process,
    Decision,
    Data,
}

impl NodeShape {
    pub const ALL: [NodeShape; 5] = [
        NodeShape::Start,
        NodeShape::End,
        NodeShape::Process,
        NodeShape::Decision,
        NodeShape::Data,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeShape::Start => "start",
            NodeShape::End => "end",
            NodeShape::Process => "process",
            NodeShape::Decision => "decision",
            NodeShape::Data => "data",
        }
    }

    /// Caption a freshly created node of this shape starts with.
    pub fn default_text(self) -> &'static str {
        match self {
            NodeShape::Start => "Start",
            NodeShape::End => "End",
            NodeShape::Process => "Process",
            NodeShape::Decision => "Condition",
            NodeShape::Data => "Data",
        }
    }

    /// Size a freshly created node of this shape starts with.
    pub fn default_size(self) -> Size {
        match self {
            NodeShape::Start | NodeShape::End => Size::new(150.0, 50.0),
            NodeShape::Process | NodeShape::Data => Size::new(150.0, 70.0),
            NodeShape::Decision => Size::new(160.0, 80.0),
        }
    }

    /// Start and end blocks delimit a flow.
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeShape::Start | NodeShape::End)
    }
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeShape {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| UnknownKeyword {
                kind: "shape",
                value: s.to_string(),
            })
    }
}

/// One of the four side midpoints where an edge may attach to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
}

impl Anchor {
    /// All anchors in scan order.
    pub const ALL: [Anchor; 4] = [Anchor::Top, Anchor::Bottom, Anchor::Left, Anchor::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
            Anchor::Right => "right",
        }
    }

    /// Unit vector pointing away from the node at this anchor.
    pub fn outward_normal(self) -> Point {
        match self {
            Anchor::Top => Point::new(0.0, -1.0),
            Anchor::Bottom => Point::new(0.0, 1.0),
            Anchor::Left => Point::new(-1.0, 0.0),
            Anchor::Right => Point::new(1.0, 0.0),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|anchor| anchor.as_str() == s)
            .ok_or_else(|| UnknownKeyword {
                kind: "anchor",
                value: s.to_string(),
            })
    }
}

/// A flowchart block.
///
/// The rectangle is stored by its top-left corner and size. Width and height
/// are kept at least as large as the caption needs by the owning store.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    shape: NodeShape,
    bounds: Bounds,
    color: Color,
    text: String,
}

impl Node {
    pub fn new(
        id: NodeId,
        shape: NodeShape,
        bounds: Bounds,
        color: Color,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            shape,
            bounds,
            color,
            text: text.into(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        self.bounds.min_point()
    }

    pub fn size(&self) -> Size {
        self.bounds.to_size()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caption with line breaks flattened to spaces.
    pub fn flat_text(&self) -> String {
        self.text.replace('\n', " ")
    }

    pub fn set_position(&mut self, top_left: Point) {
        self.bounds = Bounds::new_from_top_left(top_left, self.size());
    }

    pub fn set_size(&mut self, size: Size) {
        self.bounds = Bounds::new_from_top_left(self.position(), size);
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// One end of an edge: a node and the anchor on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub node: NodeId,
    pub anchor: Anchor,
}

impl Endpoint {
    pub fn new(node: NodeId, anchor: Anchor) -> Self {
        Self { node, anchor }
    }
}

/// A directed connector from one node anchor to another.
///
/// The path is derived from the endpoint nodes' geometry and is recomputed
/// by the store whenever that geometry changes; it is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,
    from: Endpoint,
    to: Endpoint,
    text: String,
    path: Vec<Point>,
}

impl Edge {
    pub fn new(id: EdgeId, from: Endpoint, to: Endpoint, text: impl Into<String>) -> Self {
        Self {
            id,
            from,
            to,
            text: text.into(),
            path: Vec::new(),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Where the edge departs.
    pub fn source(&self) -> Endpoint {
        self.from
    }

    /// Where the edge arrives.
    pub fn target(&self) -> Endpoint {
        self.to
    }

    /// Label text; empty when the edge has no label.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Waypoints from the source anchor to the destination anchor.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Returns true if either end attaches to `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from.node == node || self.to.node == node
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_path(&mut self, path: Vec<Point>) {
        self.path = path;
    }
}

/// Reference to a node or an edge by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Node(NodeId),
    Edge(EdgeId),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Node(id) => fmt::Display::fmt(id, f),
            ItemRef::Edge(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl From<NodeId> for ItemRef {
    fn from(id: NodeId) -> Self {
        ItemRef::Node(id)
    }
}

impl From<EdgeId> for ItemRef {
    fn from(id: EdgeId) -> Self {
        ItemRef::Edge(id)
    }
}
