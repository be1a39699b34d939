//! Orchestration: neighbor discovery, per-pair separation records, and the
//! composable filtering view consumed by the rendering stage.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::basin::{BasinId, BasinTable};
use crate::error::SeparationError;
use crate::flow::FlowIntegrator;
use crate::geometry::Border;
use crate::neighbors::find_neighbors;

/// Default maximum centroid distance for the neighbor search, in
/// coordinate units.
pub const DEFAULT_PAIR_MAX_DIST: f64 = 20_000.0;

/// One neighbor pair with its separation distance and shared border.
#[derive(Clone, Debug, Serialize)]
pub struct SeparationRecord {
    pub a: BasinId,
    pub b: BasinId,
    pub separation: f64,
    pub border: Border,
}

/// Separation results over all neighbor pairs of a drainage network.
///
/// Owns the pair and record tables; holds the integrator by shared
/// reference and never mutates it. The filter methods narrow the current
/// view and chain; the full record set is always retained for
/// [`filter_reset`](Self::filter_reset).
pub struct WatershedSeparation<'a> {
    flow: &'a FlowIntegrator,
    pairs: Vec<(BasinId, BasinId)>,
    records: Vec<SeparationRecord>,
    view: Vec<SeparationRecord>,
}

impl<'a> WatershedSeparation<'a> {
    /// Discover neighbor pairs within [`DEFAULT_PAIR_MAX_DIST`] and
    /// compute their separation records.
    pub fn new(flow: &'a FlowIntegrator) -> Result<Self, SeparationError> {
        Self::with_max_dist(flow, DEFAULT_PAIR_MAX_DIST)
    }

    /// Same as [`new`](Self::new) with an explicit neighbor-search
    /// distance threshold.
    pub fn with_max_dist(
        flow: &'a FlowIntegrator,
        pair_max_dist: f64,
    ) -> Result<Self, SeparationError> {
        let pairs = find_neighbors(flow, pair_max_dist);
        info!(pairs = pairs.len(), "neighboring areas found");

        // Per-pair computations share only read-only state, so the loop
        // parallelizes with plain result aggregation.
        let records: Vec<SeparationRecord> = pairs
            .par_iter()
            .map(|&(a, b)| {
                let separation = flow.separation(a, b)?;
                let poly_a = flow
                    .polygon(a)
                    .ok_or(SeparationError::UnknownBasin { basin: a })?;
                let poly_b = flow
                    .polygon(b)
                    .ok_or(SeparationError::UnknownBasin { basin: b })?;
                Ok(SeparationRecord {
                    a,
                    b,
                    separation,
                    border: poly_a.shared_border(poly_b),
                })
            })
            .collect::<Result<_, SeparationError>>()?;
        info!(records = records.len(), "separation computed");

        let view = records.clone();
        Ok(Self {
            flow,
            pairs,
            records,
            view,
        })
    }

    /// The current filtered table: columns {a, b, separation, border}.
    pub fn payload(&self) -> &[SeparationRecord] {
        &self.view
    }

    /// All discovered neighbor pairs, unaffected by filtering.
    pub fn pairs(&self) -> &[(BasinId, BasinId)] {
        &self.pairs
    }

    /// Basin attribute columns for the rendering stage.
    pub fn basins(&self) -> &BasinTable {
        self.flow.basins()
    }

    /// Keep only pairs with separation strictly greater than `min_val`.
    pub fn filter_min_val(&mut self, min_val: f64) -> &mut Self {
        self.view.retain(|r| r.separation > min_val);
        self
    }

    /// Keep only pairs whose basins differ on a coarser-resolution
    /// grouping attribute, dropping pairs inside the same coarse unit.
    pub fn filter_lower_res(&mut self, attr: &str) -> Result<&mut Self, SeparationError> {
        let basins = self.flow.basins();
        let mut keep = Vec::with_capacity(self.view.len());
        for record in &self.view {
            let va = basins
                .attribute(record.a, attr)
                .ok_or_else(|| SeparationError::UnknownAttribute {
                    basin: record.a,
                    attr: attr.to_string(),
                })?;
            let vb = basins
                .attribute(record.b, attr)
                .ok_or_else(|| SeparationError::UnknownAttribute {
                    basin: record.b,
                    attr: attr.to_string(),
                })?;
            keep.push(va != vb);
        }
        let mut i = 0;
        self.view.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
        Ok(self)
    }

    /// Restore the view to the full unfiltered record set.
    pub fn filter_reset(&mut self) -> &mut Self {
        self.view = self.records.clone();
        self
    }
}
