//! Pointer interaction with a diagram store.
//!
//! [`Interaction`] translates pointer and keyboard input into store
//! mutations. It is an explicit state machine:
//!
//! ```text
//!            pointer down on anchor             pointer down (anywhere)
//!   Idle ───────────────────────────► Connecting ─────────────────────► Idle
//!    │ ▲                                                  (edge created when
//!    │ │ pointer up / escape                               released on another
//!    │ │                                                   node's anchor)
//!    ▼ │
//!   Dragging ◄── pointer down on a node
//!
//!   Idle ── double click on item ──► EditingText ── commit / pointer down ──► Idle
//!                                         └─────── escape (discard) ────────► Idle
//! ```
//!
//! The hovered anchor is tracked independently of the state so a renderer
//! can highlight it.

use log::{debug, trace};

use flowprompt_core::{
    geometry::{Bounds, Point},
    hit_test::{
        ANCHOR_RADIUS, AnchorHit, EDGE_TOLERANCE, hit_test_anchor, hit_test_edge, hit_test_node,
    },
    identifier::NodeId,
    model::{Endpoint, ItemRef},
    route::label_editor_frame,
};

use crate::{config::CanvasConfig, error::FlowError, store::DiagramStore};

/// Current phase of the interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    /// A node follows the pointer, keeping the grab offset from its corner.
    Dragging { node: NodeId, grab_offset: Point },
    /// A connector is being drawn from `origin` to the pointer.
    Connecting { origin: AnchorHit, pointer: Point },
    /// The caption of `target` is being edited.
    EditingText { target: ItemRef, draft: String },
}

/// Pointer interaction state machine.
#[derive(Debug, Clone)]
pub struct Interaction {
    state: InteractionState,
    hovered: Option<AnchorHit>,
    edge_tolerance: f32,
    anchor_radius: f32,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(EDGE_TOLERANCE, ANCHOR_RADIUS)
    }
}

impl Interaction {
    pub fn new(edge_tolerance: f32, anchor_radius: f32) -> Self {
        Self {
            state: InteractionState::Idle,
            hovered: None,
            edge_tolerance,
            anchor_radius,
        }
    }

    /// Creates an interaction using the tolerances of a canvas configuration.
    pub fn from_config(canvas: &CanvasConfig) -> Self {
        Self::new(canvas.edge_tolerance(), canvas.anchor_radius())
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Anchor under the pointer as of the last pointer move.
    pub fn hovered_anchor(&self) -> Option<AnchorHit> {
        self.hovered
    }

    /// Straight preview line of a pending connection.
    pub fn connection_preview(&self) -> Option<(Point, Point)> {
        match &self.state {
            InteractionState::Connecting { origin, pointer } => Some((origin.position, *pointer)),
            _ => None,
        }
    }

    /// Handles a primary button press.
    ///
    /// An open text edit is committed first. A pending connection completes
    /// when the press lands on another node's anchor and is dropped
    /// otherwise. Outside a connection, pressing an anchor starts one, and
    /// pressing anything else updates the selection and starts dragging a
    /// hit node.
    pub fn pointer_down(
        &mut self,
        store: &mut DiagramStore,
        point: Point,
    ) -> Result<(), FlowError> {
        if matches!(self.state, InteractionState::EditingText { .. }) {
            self.commit(store)?;
        }

        let anchor = hit_test_anchor(point, store.nodes(), self.anchor_radius);

        if let InteractionState::Connecting { origin, .. } = self.state {
            self.state = InteractionState::Idle;
            if let Some(anchor) = anchor.filter(|anchor| anchor.node != origin.node) {
                store.create_edge(
                    Endpoint::new(origin.node, origin.anchor),
                    Endpoint::new(anchor.node, anchor.anchor),
                )?;
            } else {
                debug!("Connection dropped");
            }
            return Ok(());
        }

        if let Some(anchor) = anchor {
            debug!(node:% = anchor.node, anchor:% = anchor.anchor; "Starting connection");
            self.state = InteractionState::Connecting {
                origin: anchor,
                pointer: point,
            };
            return Ok(());
        }

        match self.item_at(store, point) {
            Some(item) => {
                store.select(item)?;
                if let ItemRef::Node(id) = item {
                    if let Some(node) = store.node(id) {
                        self.state = InteractionState::Dragging {
                            node: id,
                            grab_offset: point.sub_point(node.position()),
                        };
                    }
                }
            }
            None => store.clear_selection(),
        }
        Ok(())
    }

    /// Handles pointer motion.
    ///
    /// A drag whose node has been deleted in the meantime ends quietly.
    pub fn pointer_move(
        &mut self,
        store: &mut DiagramStore,
        point: Point,
    ) -> Result<(), FlowError> {
        self.hovered = hit_test_anchor(point, store.nodes(), self.anchor_radius);

        match &mut self.state {
            InteractionState::Connecting { pointer, .. } => *pointer = point,
            InteractionState::Dragging { node, grab_offset } => {
                let node = *node;
                trace!(node:% = node; "Dragging");
                match store.set_node_position(node, point.sub_point(*grab_offset)) {
                    Err(FlowError::UnknownNode(_)) => {
                        debug!(node:% = node; "Dragged node is gone, ending drag");
                        self.state = InteractionState::Idle;
                    }
                    result => result?,
                }
            }
            InteractionState::Idle | InteractionState::EditingText { .. } => {}
        }
        Ok(())
    }

    /// Handles a primary button release.
    pub fn pointer_up(&mut self) {
        if matches!(self.state, InteractionState::Dragging { .. }) {
            self.state = InteractionState::Idle;
        }
    }

    /// Opens the text editor on the item under the pointer.
    ///
    /// Returns the frame the editor should occupy: the node rectangle, or a
    /// small box centered on the middle segment of an edge. Returns `None`
    /// and leaves the state unchanged if nothing editable is hit.
    pub fn double_click(&mut self, store: &DiagramStore, point: Point) -> Option<Bounds> {
        let (target, frame, text) = match self.item_at(store, point)? {
            ItemRef::Node(id) => {
                let node = store.node(id)?;
                (ItemRef::Node(id), node.bounds(), node.text())
            }
            ItemRef::Edge(id) => {
                let edge = store.edge(id)?;
                (ItemRef::Edge(id), label_editor_frame(edge.path())?, edge.text())
            }
        };

        debug!(item:% = target; "Editing text");
        self.state = InteractionState::EditingText {
            target,
            draft: text.to_string(),
        };
        Some(frame)
    }

    /// Text currently in the editor.
    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            InteractionState::EditingText { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Replaces the editor text; ignored when no edit is open.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let InteractionState::EditingText { draft, .. } = &mut self.state {
            *draft = text.into();
        }
    }

    /// Writes the draft to its item and closes the editor.
    pub fn commit(&mut self, store: &mut DiagramStore) -> Result<(), FlowError> {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::EditingText {
                target: ItemRef::Node(id),
                draft,
            } => store.retext_node(id, &draft),
            InteractionState::EditingText {
                target: ItemRef::Edge(id),
                draft,
            } => store.retext_edge(id, &draft),
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    /// Abandons whatever is in progress: discards a draft, drops a pending
    /// connection or ends a drag.
    pub fn escape(&mut self) {
        if self.state != InteractionState::Idle {
            debug!(state:? = self.state; "Cancelled");
        }
        self.state = InteractionState::Idle;
    }

    /// Topmost node under the pointer, else the first edge near it.
    fn item_at(&self, store: &DiagramStore, point: Point) -> Option<ItemRef> {
        hit_test_node(point, store.nodes())
            .map(|node| ItemRef::Node(node.id()))
            .or_else(|| {
                hit_test_edge(point, store.edges(), self.edge_tolerance)
                    .map(|edge| ItemRef::Edge(edge.id()))
            })
    }
}
