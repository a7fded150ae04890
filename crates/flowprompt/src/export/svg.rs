//! SVG rendering of the canvas.
//!
//! Edges are drawn first and nodes on top, so a node always hides the stubs
//! that run underneath it. Every node carries its four anchor circles.

use log::debug;
use svg::{self, node::Text as SvgText, node::element as svg_element};

use flowprompt_core::{
    color::Color,
    geometry::{Bounds, Insets, Point},
    model::{Edge, ItemRef, Node, NodeShape},
    route::{self, ARROW_LENGTH},
    text::{TextStyle, caption_lines},
};

use super::Exporter;
use crate::{config::StyleConfig, error::FlowError, store::DiagramStore};

const MARGIN: f32 = 50.0;
const SELECTED_COLOR: &str = "#007bff";
const NODE_STROKE: &str = "#2c3e50";
const EDGE_STROKE: &str = "#34495e";
const TEXT_COLOR: &str = "#212529";
const ANCHOR_COLOR: &str = "#a9a9a9";
const ANCHOR_DOT_RADIUS: f32 = 4.0;
const TERMINAL_CORNER_RADIUS: f32 = 25.0;
const DATA_SKEW: f32 = 20.0;
const LABEL_FONT_SIZE: f32 = 14.0;
const LABEL_PADDING: f32 = 6.0;
const LABEL_BOX_HEIGHT: f32 = 24.0;

/// Renders a [`DiagramStore`] as a standalone SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgExporter {
    background: Option<Color>,
}

impl SvgExporter {
    /// Creates an exporter with an optional background fill.
    pub fn new(background: Option<Color>) -> Self {
        Self { background }
    }

    /// Creates an exporter from the `[style]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidColor`] if the background color does not
    /// parse.
    pub fn from_config(config: &StyleConfig) -> Result<Self, FlowError> {
        let background = config
            .background_color()
            .map_err(FlowError::InvalidColor)?;
        Ok(Self::new(background))
    }

    /// Builds the SVG document for the current store contents.
    pub fn render(&self, store: &DiagramStore) -> svg::Document {
        let view = content_bounds(store).add_padding(Insets::uniform(MARGIN));
        let mut doc = svg::Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    view.min_x(),
                    view.min_y(),
                    view.width(),
                    view.height()
                ),
            )
            .set("width", view.width())
            .set("height", view.height());

        if let Some(background) = self.background {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("x", view.min_x())
                    .set("y", view.min_y())
                    .set("width", view.width())
                    .set("height", view.height())
                    .set("fill", background.to_hex()),
            );
        }

        let selection = store.selection();
        let label_style = TextStyle::new(
            store.text_style().font_family(),
            LABEL_FONT_SIZE,
            store.text_style().line_height(),
            Insets::default(),
        );

        for edge in store.edges() {
            let selected = selection == Some(ItemRef::Edge(edge.id()));
            if let Some(group) = render_edge(edge, selected, store, &label_style) {
                doc = doc.add(group);
            }
        }
        for node in store.nodes() {
            let selected = selection == Some(ItemRef::Node(node.id()));
            doc = doc.add(render_node(node, selected, store.text_style()));
        }

        debug!(
            nodes = store.nodes().len(),
            edges = store.edges().len();
            "Rendered SVG document"
        );
        doc
    }
}

impl Exporter for SvgExporter {
    fn export(&self, store: &DiagramStore) -> Result<String, FlowError> {
        Ok(self.render(store).to_string())
    }
}

/// Union of node rectangles and edge paths; empty stores collapse to the
/// origin.
fn content_bounds(store: &DiagramStore) -> Bounds {
    let nodes = store.nodes().iter().map(Node::bounds);
    let paths = store
        .edges()
        .iter()
        .filter_map(|edge| Bounds::enclosing(edge.path().iter().copied()));

    nodes
        .chain(paths)
        .reduce(|acc, bounds| acc.merge(&bounds))
        .unwrap_or_default()
}

fn stroke(selected: bool, normal: &'static str) -> (&'static str, f32) {
    if selected {
        (SELECTED_COLOR, 3.0)
    } else {
        (normal, 2.0)
    }
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|point| format!("{},{}", point.x(), point.y()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_node(node: &Node, selected: bool, style: &TextStyle) -> svg_element::Group {
    let (stroke_color, stroke_width) = stroke(selected, NODE_STROKE);
    let bounds = node.bounds();
    let fill = node.color().to_hex();

    let mut group = svg_element::Group::new().set("data-node", node.id().get());
    group = match node.shape() {
        NodeShape::Start | NodeShape::End => {
            let radius = TERMINAL_CORNER_RADIUS
                .min(bounds.width() / 2.0)
                .min(bounds.height() / 2.0);
            group.add(
                svg_element::Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("rx", radius)
                    .set("ry", radius)
                    .set("fill", fill)
                    .set("stroke", stroke_color)
                    .set("stroke-width", stroke_width),
            )
        }
        NodeShape::Process => group.add(
            svg_element::Rectangle::new()
                .set("x", bounds.min_x())
                .set("y", bounds.min_y())
                .set("width", bounds.width())
                .set("height", bounds.height())
                .set("fill", fill)
                .set("stroke", stroke_color)
                .set("stroke-width", stroke_width),
        ),
        NodeShape::Decision => {
            let center = bounds.center();
            let corners = [
                Point::new(center.x(), bounds.min_y()),
                Point::new(bounds.max_x(), center.y()),
                Point::new(center.x(), bounds.max_y()),
                Point::new(bounds.min_x(), center.y()),
            ];
            group.add(
                svg_element::Polygon::new()
                    .set("points", points_attr(&corners))
                    .set("fill", fill)
                    .set("stroke", stroke_color)
                    .set("stroke-width", stroke_width),
            )
        }
        NodeShape::Data => {
            let corners = [
                Point::new(bounds.min_x() + DATA_SKEW, bounds.min_y()),
                Point::new(bounds.max_x(), bounds.min_y()),
                Point::new(bounds.max_x() - DATA_SKEW, bounds.max_y()),
                Point::new(bounds.min_x(), bounds.max_y()),
            ];
            group.add(
                svg_element::Polygon::new()
                    .set("points", points_attr(&corners))
                    .set("fill", fill)
                    .set("stroke", stroke_color)
                    .set("stroke-width", stroke_width),
            )
        }
    };

    group = group.add(render_caption(node, style));

    for (_, point) in route::attachment_points(bounds).iter() {
        group = group.add(
            svg_element::Circle::new()
                .set("cx", point.x())
                .set("cy", point.y())
                .set("r", ANCHOR_DOT_RADIUS)
                .set("fill", ANCHOR_COLOR),
        );
    }
    group
}

/// Caption lines centered on the node, spaced by the line height.
fn render_caption(node: &Node, style: &TextStyle) -> svg_element::Text {
    let center = node.bounds().center();
    let lines: Vec<&str> = caption_lines(node.text()).collect();
    let line_height = style.line_height();
    let first_y = center.y() - line_height * (lines.len() as f32 - 1.0) / 2.0;

    let mut text = svg_element::Text::new("")
        .set("text-anchor", "middle")
        .set("dominant-baseline", "central")
        .set("font-family", style.font_family())
        .set("font-size", style.font_size())
        .set("fill", TEXT_COLOR);
    for (index, line) in lines.into_iter().enumerate() {
        let tspan = svg_element::TSpan::new("")
            .set("x", center.x())
            .set("y", first_y + index as f32 * line_height)
            .add(SvgText::new(line));
        text = text.add(tspan);
    }
    text
}

fn render_edge(
    edge: &Edge,
    selected: bool,
    store: &DiagramStore,
    label_style: &TextStyle,
) -> Option<svg_element::Group> {
    let path = edge.path();
    let head = route::arrowhead(path, ARROW_LENGTH)?;
    let (stroke_color, stroke_width) = stroke(selected, EDGE_STROKE);

    // The shaft stops at the arrowhead base so the tip stays sharp.
    let mut shaft: Vec<Point> = path[..path.len() - 1].to_vec();
    shaft.push(head.base);

    let mut group = svg_element::Group::new()
        .set("data-edge", edge.id().get())
        .add(
            svg_element::Polyline::new()
                .set("points", points_attr(&shaft))
                .set("fill", "none")
                .set("stroke", stroke_color)
                .set("stroke-width", stroke_width),
        )
        .add(
            svg_element::Polygon::new()
                .set("points", points_attr(&[head.tip, head.left, head.right]))
                .set("fill", stroke_color)
                .set("stroke", stroke_color)
                .set("stroke-width", stroke_width),
        );

    if !edge.text().is_empty() {
        if let Some(anchor) = route::label_anchor(path) {
            let width = store.text_measure().line_width(edge.text(), label_style);
            group = group
                .add(
                    svg_element::Rectangle::new()
                        .set("x", anchor.x() - width / 2.0 - LABEL_PADDING)
                        .set("y", anchor.y() - LABEL_BOX_HEIGHT / 2.0)
                        .set("width", width + 2.0 * LABEL_PADDING)
                        .set("height", LABEL_BOX_HEIGHT)
                        .set("fill", "white"),
                )
                .add(
                    svg_element::Text::new("")
                        .set("x", anchor.x())
                        .set("y", anchor.y())
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "central")
                        .set("font-family", label_style.font_family())
                        .set("font-size", LABEL_FONT_SIZE)
                        .set("fill", EDGE_STROKE)
                        .add(SvgText::new(edge.text())),
                );
        }
    }

    Some(group)
}
