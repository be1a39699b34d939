//! Flow-path integration along outflow chains.
//!
//! The separation of two basins is the length of the flow path connecting
//! them through their lowest common ancestor: each basin's chain of
//! outflow points is integrated up to the LCA, and the two partial lengths
//! are combined. Integration stops at the LCA exclusively, so the final
//! leg into the common outflow is not counted twice.

use std::collections::HashMap;

use tracing::info;

use crate::ancestry::AncestryIndex;
use crate::basin::{BasinId, BasinTable, OutflowTable, SENTINEL};
use crate::error::SeparationError;
use crate::geometry::{Point, Polygon};
use crate::hierarchy::Hierarchy;

/// Tolerance for the meeting-point consistency check, in coordinate units.
const MEETING_EPS: f64 = 1e-6;

/// Owns the provider snapshot (basins, resolved outflow points, derived
/// centroids) and the ancestry index built from it. Read-only for its
/// whole lifetime once constructed.
#[derive(Debug)]
pub struct FlowIntegrator {
    basins: BasinTable,
    ancestry: AncestryIndex,
    centroids: HashMap<BasinId, Point>,
    outflows: HashMap<BasinId, Point>,
}

impl FlowIntegrator {
    /// Build the hierarchy and ancestry index from a provider snapshot and
    /// resolve per-basin integration points.
    ///
    /// A basin without an outflow entry falls back to its centroid; a
    /// basin with neither fails with [`SeparationError::MissingGeometry`].
    pub fn new(basins: BasinTable, outflows: OutflowTable) -> Result<Self, SeparationError> {
        let mut centroid_map = HashMap::with_capacity(basins.len());
        let mut outflow_map = HashMap::with_capacity(basins.len());
        for basin in basins.iter() {
            let centroid = basin.polygon.centroid();
            let outflow = outflows.get(basin.id);
            let (centroid, outflow) = match (centroid, outflow) {
                (Some(c), Some(o)) => (c, o),
                (Some(c), None) => (c, c),
                (None, Some(o)) => (o, o),
                (None, None) => {
                    return Err(SeparationError::MissingGeometry { basin: basin.id })
                }
            };
            centroid_map.insert(basin.id, centroid);
            outflow_map.insert(basin.id, outflow);
        }

        let hierarchy = Hierarchy::build(&basins)?;
        info!(
            basins = hierarchy.len(),
            roots = hierarchy.children(SENTINEL).len(),
            "hierarchy built"
        );
        let ancestry = AncestryIndex::new(hierarchy);

        Ok(Self {
            basins,
            ancestry,
            centroids: centroid_map,
            outflows: outflow_map,
        })
    }

    pub fn basins(&self) -> &BasinTable {
        &self.basins
    }

    pub fn ancestry(&self) -> &AncestryIndex {
        &self.ancestry
    }

    pub fn polygon(&self, id: BasinId) -> Option<&Polygon> {
        self.basins.get(id).map(|b| &b.polygon)
    }

    pub fn centroid(&self, id: BasinId) -> Result<Point, SeparationError> {
        self.centroids
            .get(&id)
            .copied()
            .ok_or(SeparationError::UnknownBasin { basin: id })
    }

    /// Resolved outflow point (recorded point or centroid fallback).
    pub fn outflow(&self, id: BasinId) -> Result<Point, SeparationError> {
        self.outflows
            .get(&id)
            .copied()
            .ok_or(SeparationError::UnknownBasin { basin: id })
    }

    /// Integrate cumulative path length along an ancestor chain.
    ///
    /// The running point starts at the first basin's centroid
    /// (`from_centroid`) or its outflow point, then accumulates Euclidean
    /// distances between consecutive outflow points. Reaching `stop`
    /// returns before its segment is added, with `stop`'s outflow as the
    /// stopping point; reaching the sentinel returns the last real outflow
    /// visited.
    pub fn integrate_length(
        &self,
        chain: &[BasinId],
        stop: BasinId,
        from_centroid: bool,
    ) -> Result<(f64, Point), SeparationError> {
        let first = match chain.first() {
            Some(&id) => id,
            None => return Err(SeparationError::UnknownBasin { basin: SENTINEL }),
        };
        let mut pt_fr = if from_centroid {
            self.centroid(first)?
        } else {
            self.outflow(first)?
        };
        let mut total = 0.0;
        let mut stop_pt = pt_fr;
        for &id in chain {
            if id == SENTINEL {
                break;
            }
            let pt_to = self.outflow(id)?;
            stop_pt = pt_to;
            if id == stop {
                return Ok((total, pt_to));
            }
            total += pt_fr.distance(&pt_to);
            pt_fr = pt_to;
        }
        Ok((total, stop_pt))
    }

    /// Separation of two distinct basins: both flow paths integrated up to
    /// their lowest common ancestor.
    ///
    /// When the LCA is one of the pair, integration starts from the
    /// outflow points; otherwise from the centroids. With the sentinel as
    /// LCA the paths never physically meet, so the straight-line gap
    /// between the stopping points is added. Inside the network the two
    /// stopping points must coincide at the LCA's outflow; any gap is a
    /// data-integrity error.
    pub fn separation(&self, x: BasinId, y: BasinId) -> Result<f64, SeparationError> {
        if x == y {
            return Err(SeparationError::SelfPair { basin: x });
        }
        let lca = self.ancestry.lca(x, y)?;
        let from_centroid = lca != x && lca != y;

        let chain_x = self
            .ancestry
            .chain(x)
            .ok_or(SeparationError::UnknownBasin { basin: x })?;
        let chain_y = self
            .ancestry
            .chain(y)
            .ok_or(SeparationError::UnknownBasin { basin: y })?;
        let (len_x, pt_x) = self.integrate_length(chain_x, lca, from_centroid)?;
        let (len_y, pt_y) = self.integrate_length(chain_y, lca, from_centroid)?;

        if lca == SENTINEL {
            return Ok(len_x + len_y + pt_x.distance(&pt_y));
        }
        let gap = pt_x.distance(&pt_y);
        if gap > MEETING_EPS {
            return Err(SeparationError::MeetingPointMismatch {
                a: x,
                b: y,
                lca,
                point_a: pt_x,
                point_b: pt_y,
                gap,
            });
        }
        Ok(len_x + len_y)
    }
}
