//! Connector routing between node anchors.
//!
//! Every edge is drawn as an orthogonal polyline that leaves its source
//! anchor along the anchor's outward normal, makes a single bend, and enters
//! the destination anchor along that anchor's outward normal:
//!
//! ```text
//!   source ──► stub ─────────────┐  (x of destination stub, y of source stub)
//!                                │
//!                                ▼
//!                        destination stub
//!                                │
//!                                ▼
//!                          destination
//! ```
//!
//! Because both ends are extruded by a stub, the path never starts or ends
//! by cutting through the interior of its own nodes.
//!
//! Arrowhead and label placement are derived from the same path.

use std::f32::consts::FRAC_PI_6;

use crate::{
    geometry::{Bounds, Point, Size},
    model::Anchor,
};

/// Default distance a connector runs straight out of an anchor.
pub const DEFAULT_STUB_LENGTH: f32 = 20.0;

/// Default arrowhead side length.
pub const ARROW_LENGTH: f32 = 12.0;

/// Size of the inline editor opened on an edge label.
pub const LABEL_EDITOR_SIZE: Size = Size::new(80.0, 25.0);

/// The four anchor positions of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachmentPoints {
    pub top: Point,
    pub bottom: Point,
    pub left: Point,
    pub right: Point,
}

impl AttachmentPoints {
    /// Position of a single anchor.
    pub fn get(&self, anchor: Anchor) -> Point {
        match anchor {
            Anchor::Top => self.top,
            Anchor::Bottom => self.bottom,
            Anchor::Left => self.left,
            Anchor::Right => self.right,
        }
    }

    /// Anchors with their positions, in [`Anchor::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Anchor, Point)> + '_ {
        Anchor::ALL.into_iter().map(|anchor| (anchor, self.get(anchor)))
    }
}

/// Side midpoints of a node rectangle.
///
/// # Examples
///
/// ```
/// # use flowprompt_core::geometry::{Bounds, Point, Size};
/// # use flowprompt_core::route::attachment_points;
/// let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 40.0));
/// let points = attachment_points(bounds);
/// assert_eq!(points.top, Point::new(50.0, 0.0));
/// assert_eq!(points.right, Point::new(100.0, 20.0));
/// ```
pub fn attachment_points(bounds: Bounds) -> AttachmentPoints {
    let center = bounds.center();
    AttachmentPoints {
        top: Point::new(center.x(), bounds.min_y()),
        bottom: Point::new(center.x(), bounds.max_y()),
        left: Point::new(bounds.min_x(), center.y()),
        right: Point::new(bounds.max_x(), center.y()),
    }
}

/// Computes the waypoints of a connector.
///
/// The result always has five points: `from`, the source stub end, the bend
/// `(destination stub x, source stub y)`, the destination stub end and `to`.
/// The first point equals `from` and the last equals `to` exactly.
///
/// # Examples
///
/// ```
/// # use flowprompt_core::geometry::Point;
/// # use flowprompt_core::model::Anchor;
/// # use flowprompt_core::route::route_edge;
/// let path = route_edge(
///     Point::new(100.0, 50.0),
///     Anchor::Right,
///     Point::new(200.0, 120.0),
///     Anchor::Top,
///     20.0,
/// );
/// assert_eq!(
///     path,
///     vec![
///         Point::new(100.0, 50.0),
///         Point::new(120.0, 50.0),
///         Point::new(200.0, 50.0),
///         Point::new(200.0, 100.0),
///         Point::new(200.0, 120.0),
///     ]
/// );
/// ```
pub fn route_edge(
    from: Point,
    from_anchor: Anchor,
    to: Point,
    to_anchor: Anchor,
    stub_length: f32,
) -> Vec<Point> {
    let departure = from.add_point(from_anchor.outward_normal().scale(stub_length));
    let approach = to.add_point(to_anchor.outward_normal().scale(stub_length));
    let bend = Point::new(approach.x(), departure.y());

    vec![from, departure, bend, approach, to]
}

/// Triangle drawn at the end of a connector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    /// The destination anchor, where the triangle points.
    pub tip: Point,
    /// Where the shaft of the connector stops.
    pub base: Point,
    pub left: Point,
    pub right: Point,
}

/// Computes the arrowhead for a path, rotated to its final segment.
///
/// Returns `None` for paths with fewer than two points.
pub fn arrowhead(path: &[Point], length: f32) -> Option<Arrowhead> {
    let [.., before_tip, tip] = path else {
        return None;
    };

    let angle = (tip.y() - before_tip.y()).atan2(tip.x() - before_tip.x());
    let base = Point::new(
        tip.x() - length * angle.cos(),
        tip.y() - length * angle.sin(),
    );
    let wing = |theta: f32| {
        Point::new(
            base.x() - length * theta.cos(),
            base.y() - length * theta.sin(),
        )
    };

    Some(Arrowhead {
        tip: *tip,
        base,
        left: wing(angle - FRAC_PI_6),
        right: wing(angle + FRAC_PI_6),
    })
}

/// Position of an edge label.
///
/// The label sits at the midpoint of the longest segment along the path's
/// dominant axis: horizontal when the summed horizontal travel is at least
/// the summed vertical travel, vertical otherwise. The first of equally long
/// segments wins. Returns `None` for paths with fewer than two points.
pub fn label_anchor(path: &[Point]) -> Option<Point> {
    let (total_h, total_v) = path.windows(2).fold((0.0_f32, 0.0_f32), |(h, v), pair| {
        let delta = pair[1].sub_point(pair[0]);
        (h + delta.x().abs(), v + delta.y().abs())
    });
    let prefer_horizontal = total_h >= total_v;

    let mut best: Option<(f32, Point)> = None;
    for pair in path.windows(2) {
        let delta = pair[1].sub_point(pair[0]);
        let extent = if prefer_horizontal {
            delta.x().abs()
        } else {
            delta.y().abs()
        };
        if best.is_none_or(|(longest, _)| extent > longest) {
            best = Some((extent, pair[0].midpoint(pair[1])));
        }
    }

    best.map(|(_, midpoint)| midpoint)
}

/// Frame of the inline label editor for an edge.
///
/// Centered on the middle segment of the path (index `(len - 1) / 2`).
pub fn label_editor_frame(path: &[Point]) -> Option<Bounds> {
    if path.len() < 2 {
        return None;
    }
    let index = (path.len() - 1) / 2;
    let start = path[index];
    let end = path.get(index + 1).copied().unwrap_or(start);

    Some(Bounds::new_from_center(
        start.midpoint(end),
        LABEL_EDITOR_SIZE,
    ))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn sample_bounds() -> Bounds {
        Bounds::new_from_top_left(Point::new(50.0, 50.0), Size::new(150.0, 70.0))
    }

    #[test]
    fn test_attachment_points_are_side_midpoints() {
        let points = attachment_points(sample_bounds());
        assert_eq!(points.top, Point::new(125.0, 50.0));
        assert_eq!(points.bottom, Point::new(125.0, 120.0));
        assert_eq!(points.left, Point::new(50.0, 85.0));
        assert_eq!(points.right, Point::new(200.0, 85.0));
    }

    #[test]
    fn test_attachment_points_iter_order() {
        let anchors: Vec<Anchor> = attachment_points(sample_bounds())
            .iter()
            .map(|(anchor, _)| anchor)
            .collect();
        assert_eq!(anchors, Anchor::ALL.to_vec());
    }

    #[test]
    fn test_route_edge_endpoints_for_every_anchor_pair() {
        let from = Point::new(10.0, 30.0);
        let to = Point::new(240.0, 190.0);

        for from_anchor in Anchor::ALL {
            for to_anchor in Anchor::ALL {
                let path = route_edge(from, from_anchor, to, to_anchor, DEFAULT_STUB_LENGTH);
                assert_eq!(path.first(), Some(&from), "{from_anchor}->{to_anchor}");
                assert_eq!(path.last(), Some(&to), "{from_anchor}->{to_anchor}");
                assert_eq!(path.len(), 5);
            }
        }
    }

    #[test]
    fn test_route_edge_stubs_follow_outward_normals() {
        let from = Point::new(100.0, 100.0);
        let to = Point::new(0.0, 0.0);

        for from_anchor in Anchor::ALL {
            for to_anchor in Anchor::ALL {
                let path = route_edge(from, from_anchor, to, to_anchor, 20.0);
                let departure = path[1].sub_point(path[0]);
                let arrival = path[3].sub_point(path[4]);
                assert_eq!(departure, from_anchor.outward_normal().scale(20.0));
                assert_eq!(arrival, to_anchor.outward_normal().scale(20.0));
            }
        }
    }

    #[test]
    fn test_route_edge_bend_uses_destination_x_and_source_y() {
        let path = route_edge(
            Point::new(125.0, 120.0),
            Anchor::Bottom,
            Point::new(300.0, 200.0),
            Anchor::Left,
            20.0,
        );
        assert_eq!(path[1], Point::new(125.0, 140.0));
        assert_eq!(path[2], Point::new(280.0, 140.0));
        assert_eq!(path[3], Point::new(280.0, 200.0));
    }

    #[test]
    fn test_route_edge_is_orthogonal() {
        let path = route_edge(
            Point::new(13.0, 71.0),
            Anchor::Left,
            Point::new(-40.0, 5.0),
            Anchor::Bottom,
            20.0,
        );
        for pair in path.windows(2) {
            let delta = pair[1].sub_point(pair[0]);
            assert!(delta.x() == 0.0 || delta.y() == 0.0, "diagonal segment {pair:?}");
        }
    }

    #[test]
    fn test_arrowhead_points_along_last_segment() {
        let path = [Point::new(0.0, 0.0), Point::new(0.0, 50.0), Point::new(0.0, 100.0)];
        let head = arrowhead(&path, ARROW_LENGTH).expect("path has segments");

        assert_eq!(head.tip, Point::new(0.0, 100.0));
        assert_approx_eq!(f32, head.base.x(), 0.0, epsilon = 1e-4);
        assert_approx_eq!(f32, head.base.y(), 88.0, epsilon = 1e-4);
        // Wings sit behind the base, mirrored around the shaft.
        assert!(head.left.y() < head.base.y());
        assert_approx_eq!(f32, head.left.x(), -head.right.x(), epsilon = 1e-4);
        assert_approx_eq!(f32, head.left.y(), head.right.y(), epsilon = 1e-4);
    }

    #[test]
    fn test_arrowhead_needs_two_points() {
        assert!(arrowhead(&[], ARROW_LENGTH).is_none());
        assert!(arrowhead(&[Point::new(1.0, 1.0)], ARROW_LENGTH).is_none());
    }

    #[test]
    fn test_label_anchor_prefers_longest_horizontal_leg() {
        let path = route_edge(
            Point::new(0.0, 0.0),
            Anchor::Right,
            Point::new(300.0, 40.0),
            Anchor::Top,
            20.0,
        );
        // Horizontal travel 300 >= vertical 60; the 20..300 leg is longest.
        assert_eq!(label_anchor(&path), Some(Point::new(160.0, 0.0)));
    }

    #[test]
    fn test_label_anchor_prefers_longest_vertical_leg() {
        let path = route_edge(
            Point::new(0.0, 0.0),
            Anchor::Bottom,
            Point::new(30.0, 400.0),
            Anchor::Top,
            20.0,
        );
        // Vertical travel dominates; the leg from y=20 to y=380 is longest.
        assert_eq!(label_anchor(&path), Some(Point::new(30.0, 200.0)));
    }

    #[test]
    fn test_label_anchor_degenerate_paths() {
        assert_eq!(label_anchor(&[]), None);
        assert_eq!(label_anchor(&[Point::new(3.0, 3.0)]), None);
    }

    #[test]
    fn test_label_editor_frame_centers_on_middle_segment() {
        let path = [
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(120.0, 0.0),
            Point::new(120.0, 40.0),
            Point::new(120.0, 60.0),
        ];
        let frame = label_editor_frame(&path).expect("path has segments");
        assert_eq!(frame.center(), Point::new(70.0, 0.0));
        assert_eq!(frame.to_size(), LABEL_EDITOR_SIZE);
        assert!(label_editor_frame(&path[..1]).is_none());
    }

    proptest! {
        #[test]
        fn prop_route_edge_endpoints_are_exact(
            fx in -1000.0f32..1000.0,
            fy in -1000.0f32..1000.0,
            tx in -1000.0f32..1000.0,
            ty in -1000.0f32..1000.0,
            from_index in 0usize..4,
            to_index in 0usize..4,
            stub in 0.0f32..60.0,
        ) {
            let from = Point::new(fx, fy);
            let to = Point::new(tx, ty);
            let path = route_edge(from, Anchor::ALL[from_index], to, Anchor::ALL[to_index], stub);
            prop_assert_eq!(path[0], from);
            prop_assert_eq!(path[path.len() - 1], to);
        }
    }
}
