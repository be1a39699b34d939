//! Neighbor-pair discovery over basin centroids.
//!
//! A balanced 2-D point tree over the centroids keeps the candidate search
//! out of O(n²); candidates within the distance threshold are then kept
//! only when their polygons actually touch.

use crate::basin::BasinId;
use crate::flow::FlowIntegrator;
use crate::geometry::Point;

struct KdNode {
    point: Point,
    id: BasinId,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

/// Balanced kd-tree over id-tagged points, built once by median split.
pub struct KdTree {
    root: Option<Box<KdNode>>,
    len: usize,
}

impl KdTree {
    pub fn build(items: Vec<(BasinId, Point)>) -> Self {
        let len = items.len();
        let root = build_node(items, 0);
        Self { root, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ids of all points within `radius` of `center` (inclusive).
    pub fn within(&self, center: Point, radius: f64) -> Vec<BasinId> {
        let mut found = Vec::new();
        visit(&self.root, center, radius, 0, &mut found);
        found
    }
}

fn axis_value(p: &Point, axis: usize) -> f64 {
    if axis == 0 {
        p.x
    } else {
        p.y
    }
}

fn build_node(mut items: Vec<(BasinId, Point)>, depth: usize) -> Option<Box<KdNode>> {
    if items.is_empty() {
        return None;
    }
    let axis = depth % 2;
    items.sort_by(|a, b| {
        axis_value(&a.1, axis)
            .total_cmp(&axis_value(&b.1, axis))
            .then(a.0.cmp(&b.0))
    });
    let mid = items.len() / 2;
    let right = items.split_off(mid + 1);
    let (id, point) = match items.pop() {
        Some(median) => median,
        None => return None,
    };
    Some(Box::new(KdNode {
        point,
        id,
        left: build_node(items, depth + 1),
        right: build_node(right, depth + 1),
    }))
}

fn visit(
    node: &Option<Box<KdNode>>,
    center: Point,
    radius: f64,
    depth: usize,
    found: &mut Vec<BasinId>,
) {
    let node = match node {
        Some(n) => n,
        None => return,
    };
    if center.distance(&node.point) <= radius {
        found.push(node.id);
    }
    let axis = depth % 2;
    let delta = axis_value(&center, axis) - axis_value(&node.point, axis);
    if delta <= radius {
        visit(&node.left, center, radius, depth + 1, found);
    }
    if delta >= -radius {
        visit(&node.right, center, radius, depth + 1, found);
    }
}

/// Unordered basin pairs (a < b) whose centroids lie within `max_dist` and
/// whose polygons intersect. Each valid pair appears exactly once; pairs
/// failing the intersection test are dropped even when within distance.
/// Output is sorted for reproducibility.
pub fn find_neighbors(flow: &FlowIntegrator, max_dist: f64) -> Vec<(BasinId, BasinId)> {
    let items: Vec<(BasinId, Point)> = flow
        .basins()
        .iter()
        .filter_map(|b| flow.centroid(b.id).ok().map(|c| (b.id, c)))
        .collect();
    let tree = KdTree::build(items.clone());

    let mut pairs = Vec::new();
    for &(id, centroid) in &items {
        for other in tree.within(centroid, max_dist) {
            if other <= id {
                continue;
            }
            let touch = match (flow.polygon(id), flow.polygon(other)) {
                (Some(a), Some(b)) => a.intersects(b),
                _ => false,
            };
            if touch {
                pairs.push((id, other));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basin::{Basin, BasinTable, OutflowTable};
    use crate::geometry::Polygon;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn flow_from(basins: Vec<Basin>) -> FlowIntegrator {
        let table = BasinTable::new(basins).unwrap();
        FlowIntegrator::new(table, OutflowTable::default()).unwrap()
    }

    #[test]
    fn within_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let items: Vec<(BasinId, Point)> = (0..200)
            .map(|i| {
                (
                    i as BasinId,
                    Point::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)),
                )
            })
            .collect();
        let tree = KdTree::build(items.clone());
        assert_eq!(tree.len(), 200);

        let center = Point::new(500.0, 500.0);
        let radius = 180.0;
        let mut got = tree.within(center, radius);
        got.sort_unstable();
        let mut expected: Vec<BasinId> = items
            .iter()
            .filter(|(_, p)| center.distance(p) <= radius)
            .map(|(id, _)| *id)
            .collect();
        expected.sort_unstable();
        assert_eq!(got, expected);
    }

    #[test]
    fn adjacent_basins_form_one_pair() {
        let flow = flow_from(vec![
            Basin::new(1, 0.0, 4.0, Polygon::rectangle(0.0, 0.0, 10.0, 10.0)),
            Basin::new(2, 5.0, 9.0, Polygon::rectangle(10.0, 0.0, 20.0, 10.0)),
        ]);
        let pairs = find_neighbors(&flow, 20_000.0);
        assert_eq!(pairs, vec![(1, 2)]);
    }

    #[test]
    fn within_distance_but_disjoint_is_excluded() {
        // centroids 100 units apart, threshold 20000, polygons disjoint
        let flow = flow_from(vec![
            Basin::new(1, 0.0, 4.0, Polygon::rectangle(0.0, 0.0, 10.0, 10.0)),
            Basin::new(2, 5.0, 9.0, Polygon::rectangle(100.0, 0.0, 110.0, 10.0)),
        ]);
        let pairs = find_neighbors(&flow, 20_000.0);
        assert!(pairs.is_empty());
    }

    #[test]
    fn beyond_distance_is_excluded_even_when_touching() {
        let flow = flow_from(vec![
            Basin::new(1, 0.0, 4.0, Polygon::rectangle(0.0, 0.0, 10.0, 10.0)),
            Basin::new(2, 5.0, 9.0, Polygon::rectangle(10.0, 0.0, 20.0, 10.0)),
        ]);
        let pairs = find_neighbors(&flow, 5.0);
        assert!(pairs.is_empty());
    }

    #[test]
    fn no_self_pairs_and_no_duplicates() {
        let flow = flow_from(vec![
            Basin::new(1, 0.0, 10.0, Polygon::rectangle(0.0, 0.0, 20.0, 10.0)),
            Basin::new(2, 1.0, 5.0, Polygon::rectangle(0.0, 0.0, 10.0, 10.0)),
            Basin::new(3, 6.0, 9.0, Polygon::rectangle(10.0, 0.0, 20.0, 10.0)),
        ]);
        let pairs = find_neighbors(&flow, 20_000.0);
        let mut dedup = pairs.clone();
        dedup.dedup();
        assert_eq!(pairs, dedup);
        for &(a, b) in &pairs {
            assert!(a < b);
        }
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn empty_input_yields_no_pairs() {
        let flow = flow_from(Vec::new());
        assert!(find_neighbors(&flow, 20_000.0).is_empty());
    }
}
