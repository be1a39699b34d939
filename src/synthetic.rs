//! Seeded synthetic drainage networks for the demo binary and tests.
//!
//! Real inputs come from geospatial files parsed outside this crate; the
//! generator stands in for them with a recursively subdivided rectangle:
//! every basin is split into `fanout` strips with jittered widths, child
//! nesting intervals are placed strictly inside the parent's, and outflow
//! points sit on the upstream strip edge. Deterministic for a given seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::basin::{Basin, BasinId, BasinTable, OutflowTable};
use crate::error::SeparationError;
use crate::geometry::{Point, Polygon};

/// Attribute carrying the coarse top-level grouping of each basin.
pub const REGION_ATTR: &str = "region";

#[derive(Clone, Copy, Debug)]
pub struct SyntheticParams {
    /// Subdivision depth below the root basin.
    pub depth: usize,
    /// Children per subdivided basin.
    pub fanout: usize,
    /// Side length of the root basin, in coordinate units.
    pub extent: f64,
    /// Fraction of basins that get a recorded outflow point; the rest
    /// exercise the centroid fallback.
    pub outflow_coverage: f64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            depth: 3,
            fanout: 3,
            extent: 100_000.0,
            outflow_coverage: 0.9,
        }
    }
}

#[derive(Clone, Copy)]
struct Rect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Rect {
    fn polygon(&self) -> Polygon {
        Polygon::rectangle(self.x0, self.y0, self.x1, self.y1)
    }

    fn wider_than_tall(&self) -> bool {
        self.x1 - self.x0 >= self.y1 - self.y0
    }
}

/// Generate a nested basin network with `1 + fanout + … + fanout^depth`
/// basins.
pub fn generate(
    params: &SyntheticParams,
    seed: u64,
) -> Result<(BasinTable, OutflowTable), SeparationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut basins = Vec::new();
    let mut outflows = OutflowTable::default();
    let mut next_id: BasinId = 0;

    let root = Rect {
        x0: 0.0,
        y0: 0.0,
        x1: params.extent,
        y1: params.extent,
    };
    let root_id = next_id;
    next_id += 1;
    basins.push(
        Basin::new(root_id, 0.0, params.extent, root.polygon()).with_attr(REGION_ATTR, "root"),
    );
    place_outflow(&mut rng, &mut outflows, params, root_id, &root);

    subdivide(
        &mut rng,
        params,
        &mut basins,
        &mut outflows,
        &mut next_id,
        root,
        (0.0, params.extent),
        params.depth,
        None,
    );

    Ok((BasinTable::new(basins)?, outflows))
}

/// Split `rect` into `fanout` strips, register them as basins nested in
/// the interval `(h1, h2)`, and recurse.
#[allow(clippy::too_many_arguments)]
fn subdivide(
    rng: &mut ChaCha8Rng,
    params: &SyntheticParams,
    basins: &mut Vec<Basin>,
    outflows: &mut OutflowTable,
    next_id: &mut BasinId,
    rect: Rect,
    (h1, h2): (f64, f64),
    depth: usize,
    region: Option<String>,
) {
    if depth == 0 || params.fanout == 0 {
        return;
    }

    // jittered strip widths along the longer axis
    let weights: Vec<f64> = (0..params.fanout)
        .map(|_| 1.0 + rng.gen_range(-0.25..0.25))
        .collect();
    let total: f64 = weights.iter().sum();

    // each child interval sits strictly inside the parent's: the last
    // slot keeps a margin below h2
    let slot = (h2 - h1) / params.fanout as f64;

    let horizontal = rect.wider_than_tall();
    let mut offset = 0.0;
    for (i, w) in weights.iter().enumerate() {
        let frac_lo = offset / total;
        offset += w;
        let frac_hi = offset / total;

        let child_rect = if horizontal {
            let width = rect.x1 - rect.x0;
            Rect {
                x0: rect.x0 + frac_lo * width,
                y0: rect.y0,
                x1: rect.x0 + frac_hi * width,
                y1: rect.y1,
            }
        } else {
            let height = rect.y1 - rect.y0;
            Rect {
                x0: rect.x0,
                y0: rect.y0 + frac_lo * height,
                x1: rect.x1,
                y1: rect.y0 + frac_hi * height,
            }
        };

        let child_h1 = h1 + i as f64 * slot;
        let child_h2 = child_h1 + 0.9 * slot;

        let id = *next_id;
        *next_id += 1;
        let label = match &region {
            Some(r) => r.clone(),
            None => format!("r{i}"),
        };
        basins.push(
            Basin::new(id, child_h1, child_h2, child_rect.polygon())
                .with_attr(REGION_ATTR, &label),
        );
        place_outflow(rng, outflows, params, id, &child_rect);

        subdivide(
            rng,
            params,
            basins,
            outflows,
            next_id,
            child_rect,
            (child_h1, child_h2),
            depth - 1,
            Some(label),
        );
    }
}

fn place_outflow(
    rng: &mut ChaCha8Rng,
    outflows: &mut OutflowTable,
    params: &SyntheticParams,
    id: BasinId,
    rect: &Rect,
) {
    if !rng.gen_bool(params.outflow_coverage.clamp(0.0, 1.0)) {
        return;
    }
    // on the western edge, where the strip meets its upstream neighbor
    let y = rng.gen_range(rect.y0..rect.y1);
    outflows.insert(id, Point::new(rect.x0, y));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Hierarchy;

    #[test]
    fn generation_is_deterministic() {
        let params = SyntheticParams::default();
        let (a, _) = generate(&params, 42).unwrap();
        let (b, _) = generate(&params, 42).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.h1, y.h1);
            assert_eq!(x.h2, y.h2);
            assert_eq!(x.polygon, y.polygon);
        }
    }

    #[test]
    fn basin_count_matches_fanout_and_depth() {
        let params = SyntheticParams {
            depth: 2,
            fanout: 3,
            ..SyntheticParams::default()
        };
        let (basins, _) = generate(&params, 1).unwrap();
        assert_eq!(basins.len(), 1 + 3 + 9);
    }

    #[test]
    fn bounds_are_laminar_and_rooted_at_the_generated_root() {
        let (basins, _) = generate(&SyntheticParams::default(), 3).unwrap();
        let hierarchy = Hierarchy::build(&basins).unwrap();
        assert_eq!(hierarchy.len(), basins.len());
        // basin 0 is the outermost interval, so it is the only root
        use crate::basin::SENTINEL;
        assert_eq!(hierarchy.children(SENTINEL), &[0]);
    }

    #[test]
    fn every_basin_has_a_region_attribute() {
        let (basins, _) = generate(&SyntheticParams::default(), 9).unwrap();
        for basin in basins.iter() {
            assert!(basin.attrs.contains_key(REGION_ATTR));
        }
    }

    #[test]
    fn partial_outflow_coverage_leaves_gaps() {
        let params = SyntheticParams {
            outflow_coverage: 0.5,
            ..SyntheticParams::default()
        };
        let (basins, outflows) = generate(&params, 5).unwrap();
        assert!(outflows.len() < basins.len());
        assert!(!outflows.is_empty());
    }
}
