//! Planar geometry primitives for basin polygons and outflow paths.
//!
//! Coordinates are projected planar coordinates (meters). The crate only
//! needs a narrow slice of computational geometry:
//! - centroids (integration start points, neighbor search)
//! - point-in-polygon and polygon adjacency tests
//! - extraction and merging of shared border segments
//!
//! so the primitives are kept bespoke rather than pulling in a full
//! geometry kernel.

use serde::Serialize;

/// Tolerance for vertex and edge coincidence tests, in coordinate units.
pub const COORD_EPS: f64 = 1e-6;

/// A point in planar projected coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn approx_eq(&self, other: &Point) -> bool {
        (self.x - other.x).abs() <= COORD_EPS && (self.y - other.y).abs() <= COORD_EPS
    }
}

/// An open chain of points (a border piece).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Polyline(pub Vec<Point>);

impl Polyline {
    /// Total length of the chain.
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

/// Shared border geometry between two adjacent basin polygons.
///
/// Disconnected multi-segment borders are merged into a single `Line`
/// where the pieces chain end-to-end; otherwise they stay a `MultiLine`,
/// which is valid output, not a failure. Polygons touching only at
/// isolated points yield `Points`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Border {
    Empty,
    Points(Vec<Point>),
    Line(Polyline),
    MultiLine(Vec<Polyline>),
}

impl Border {
    pub fn is_empty(&self) -> bool {
        matches!(self, Border::Empty)
    }
}

/// A simple polygon. The exterior ring is stored without the duplicate
/// closing vertex; the edge from the last vertex back to the first is
/// implicit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Polygon {
    pub exterior: Vec<Point>,
}

impl Polygon {
    pub fn new(exterior: Vec<Point>) -> Self {
        Self { exterior }
    }

    /// Axis-aligned rectangle from two opposite corners.
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    /// Edges of the exterior ring, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.exterior.len();
        (0..n).map(move |i| (self.exterior[i], self.exterior[(i + 1) % n]))
    }

    /// Signed area by the shoelace formula. Positive for counter-clockwise
    /// rings.
    pub fn signed_area(&self) -> f64 {
        let n = self.exterior.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let p = self.exterior[i];
            let q = self.exterior[(i + 1) % n];
            sum += p.x * q.y - q.x * p.y;
        }
        sum / 2.0
    }

    /// Area-weighted centroid. `None` for degenerate rings (fewer than
    /// three vertices or vanishing area).
    pub fn centroid(&self) -> Option<Point> {
        let area = self.signed_area();
        if self.exterior.len() < 3 || area.abs() < COORD_EPS * COORD_EPS {
            return None;
        }
        let n = self.exterior.len();
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let p = self.exterior[i];
            let q = self.exterior[(i + 1) % n];
            let cross = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * cross;
            cy += (p.y + q.y) * cross;
        }
        Some(Point::new(cx / (6.0 * area), cy / (6.0 * area)))
    }

    /// Point-in-polygon by ray casting. Points on the boundary count as
    /// inside.
    pub fn contains(&self, pt: &Point) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if point_on_segment(pt, &a, &b) {
                return true;
            }
            if (a.y > pt.y) != (b.y > pt.y) {
                let x_cross = a.x + (pt.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if pt.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Whether two polygons intersect: any pair of edges crosses or
    /// touches, or one polygon lies inside the other.
    pub fn intersects(&self, other: &Polygon) -> bool {
        for (a, b) in self.edges() {
            for (c, d) in other.edges() {
                if segments_intersect(&a, &b, &c, &d) {
                    return true;
                }
            }
        }
        match (self.exterior.first(), other.exterior.first()) {
            (Some(p), Some(q)) => other.contains(p) || self.contains(q),
            _ => false,
        }
    }

    /// Shared border with an adjacent polygon.
    ///
    /// Edges that coincide vertex-for-vertex (in either orientation) form
    /// the border; contiguous pieces are merged. When no edges coincide
    /// but the polygons still touch, the shared vertices and edge crossing
    /// points are reported as `Points`.
    pub fn shared_border(&self, other: &Polygon) -> Border {
        let mut segments = Vec::new();
        for (a, b) in self.edges() {
            for (c, d) in other.edges() {
                let forward = a.approx_eq(&c) && b.approx_eq(&d);
                let backward = a.approx_eq(&d) && b.approx_eq(&c);
                if forward || backward {
                    segments.push((a, b));
                }
            }
        }
        if !segments.is_empty() {
            return merge_segments(segments);
        }

        let mut points: Vec<Point> = Vec::new();
        for p in &self.exterior {
            if other.exterior.iter().any(|q| q.approx_eq(p)) {
                push_unique(&mut points, *p);
            }
        }
        for (a, b) in self.edges() {
            for (c, d) in other.edges() {
                if let Some(p) = crossing_point(&a, &b, &c, &d) {
                    push_unique(&mut points, p);
                }
            }
        }
        if points.is_empty() {
            Border::Empty
        } else {
            Border::Points(points)
        }
    }
}

fn push_unique(points: &mut Vec<Point>, p: Point) {
    if !points.iter().any(|q| q.approx_eq(&p)) {
        points.push(p);
    }
}

fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn point_on_segment(p: &Point, a: &Point, b: &Point) -> bool {
    if orientation(a, b, p).abs() > COORD_EPS * a.distance(b).max(1.0) {
        return false;
    }
    p.x >= a.x.min(b.x) - COORD_EPS
        && p.x <= a.x.max(b.x) + COORD_EPS
        && p.y >= a.y.min(b.y) - COORD_EPS
        && p.y <= a.y.max(b.y) + COORD_EPS
}

/// Whether segments ab and cd intersect, including touching endpoints and
/// collinear overlap.
pub fn segments_intersect(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    point_on_segment(a, c, d)
        || point_on_segment(b, c, d)
        || point_on_segment(c, a, b)
        || point_on_segment(d, a, b)
}

/// Proper crossing point of segments ab and cd, if any. Collinear overlaps
/// yield `None`; those are handled as shared edges upstream.
fn crossing_point(a: &Point, b: &Point, c: &Point, d: &Point) -> Option<Point> {
    let denom = (b.x - a.x) * (d.y - c.y) - (b.y - a.y) * (d.x - c.x);
    if denom.abs() < COORD_EPS {
        return None;
    }
    let t = ((c.x - a.x) * (d.y - c.y) - (c.y - a.y) * (d.x - c.x)) / denom;
    let u = ((c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)))
    } else {
        None
    }
}

/// Key for endpoint matching, quantized to the coincidence tolerance.
fn endpoint_key(p: &Point) -> (i64, i64) {
    ((p.x / COORD_EPS).round() as i64, (p.y / COORD_EPS).round() as i64)
}

/// Merge segments into connected chains. Chains are only joined at
/// endpoints where exactly two segments meet, so junctions are preserved.
/// A single resulting chain becomes `Line`, several become `MultiLine`.
pub fn merge_segments(segments: Vec<(Point, Point)>) -> Border {
    use std::collections::HashMap;

    if segments.is_empty() {
        return Border::Empty;
    }

    // endpoint -> (segment index, end index) for every segment end
    let mut adjacency: HashMap<(i64, i64), Vec<(usize, usize)>> = HashMap::new();
    for (i, (a, b)) in segments.iter().enumerate() {
        adjacency.entry(endpoint_key(a)).or_default().push((i, 0));
        adjacency.entry(endpoint_key(b)).or_default().push((i, 1));
    }

    let ends = |i: usize| [segments[i].0, segments[i].1];
    let mut used = vec![false; segments.len()];
    let mut chains: Vec<Polyline> = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut chain = vec![segments[start].0, segments[start].1];

        // extend forward from the back, then backward from the front
        for forward in [true, false] {
            loop {
                let tip = if forward { chain[chain.len() - 1] } else { chain[0] };
                let at_tip = match adjacency.get(&endpoint_key(&tip)) {
                    Some(list) if list.len() == 2 => list,
                    _ => break,
                };
                let next = at_tip.iter().find(|(i, _)| !used[*i]);
                let (seg, end) = match next {
                    Some(&(i, e)) => (i, e),
                    None => break,
                };
                used[seg] = true;
                let far = ends(seg)[1 - end];
                if forward {
                    chain.push(far);
                } else {
                    chain.insert(0, far);
                }
            }
        }
        chains.push(Polyline(chain));
    }

    if chains.len() == 1 {
        Border::Line(chains.pop().unwrap_or(Polyline(Vec::new())))
    } else {
        Border::MultiLine(chains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_centroid() {
        let r = Polygon::rectangle(0.0, 0.0, 10.0, 4.0);
        let c = r.centroid().unwrap();
        assert!(c.approx_eq(&Point::new(5.0, 2.0)));
    }

    #[test]
    fn degenerate_ring_has_no_centroid() {
        let line = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert!(line.centroid().is_none());
        let sliver = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ]);
        assert!(sliver.centroid().is_none());
    }

    #[test]
    fn contains_interior_and_boundary() {
        let r = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(&Point::new(5.0, 5.0)));
        assert!(r.contains(&Point::new(0.0, 5.0)));
        assert!(!r.contains(&Point::new(11.0, 5.0)));
    }

    #[test]
    fn disjoint_rectangles_do_not_intersect() {
        let a = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        let b = Polygon::rectangle(20.0, 0.0, 30.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn edge_sharing_rectangles_intersect() {
        let a = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        let b = Polygon::rectangle(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn nested_rectangles_intersect() {
        let outer = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        let inner = Polygon::rectangle(2.0, 2.0, 4.0, 4.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn shared_border_of_adjacent_rectangles() {
        // east edge of a matches west edge of b vertex-for-vertex
        let a = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        let b = Polygon::new(vec![
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
        ]);
        match a.shared_border(&b) {
            Border::Line(line) => {
                assert_eq!(line.0.len(), 2);
                assert!((line.length() - 10.0).abs() < 1e-9);
            }
            other => panic!("expected a single line, got {:?}", other),
        }
    }

    #[test]
    fn shared_border_merges_collinear_pieces() {
        // the common edge is split at (10, 5) on both rings
        let a = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        let b = Polygon::new(vec![
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 5.0),
        ]);
        match a.shared_border(&b) {
            Border::Line(line) => {
                assert_eq!(line.0.len(), 3);
                assert!((line.length() - 10.0).abs() < 1e-9);
            }
            other => panic!("expected a merged line, got {:?}", other),
        }
    }

    #[test]
    fn corner_touch_yields_points() {
        let a = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        let b = Polygon::rectangle(10.0, 10.0, 20.0, 20.0);
        match a.shared_border(&b) {
            Border::Points(pts) => {
                assert_eq!(pts.len(), 1);
                assert!(pts[0].approx_eq(&Point::new(10.0, 10.0)));
            }
            other => panic!("expected points, got {:?}", other),
        }
    }

    #[test]
    fn merge_segments_disconnected_stays_multiline() {
        let border = merge_segments(vec![
            (Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            (Point::new(5.0, 5.0), Point::new(6.0, 5.0)),
        ]);
        match border {
            Border::MultiLine(chains) => assert_eq!(chains.len(), 2),
            other => panic!("expected multiline, got {:?}", other),
        }
    }

    #[test]
    fn merge_segments_chains_end_to_end() {
        let border = merge_segments(vec![
            (Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            (Point::new(2.0, 0.0), Point::new(1.0, 0.0)),
            (Point::new(2.0, 0.0), Point::new(2.0, 1.0)),
        ]);
        match border {
            Border::Line(line) => assert_eq!(line.0.len(), 4),
            other => panic!("expected one chain, got {:?}", other),
        }
    }

    #[test]
    fn segment_intersection_cases() {
        let o = Point::new(0.0, 0.0);
        assert!(segments_intersect(
            &o,
            &Point::new(10.0, 10.0),
            &Point::new(0.0, 10.0),
            &Point::new(10.0, 0.0),
        ));
        // collinear overlap
        assert!(segments_intersect(
            &o,
            &Point::new(5.0, 0.0),
            &Point::new(3.0, 0.0),
            &Point::new(8.0, 0.0),
        ));
        assert!(!segments_intersect(
            &o,
            &Point::new(1.0, 0.0),
            &Point::new(0.0, 1.0),
            &Point::new(1.0, 1.0),
        ));
    }
}
