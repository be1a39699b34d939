//! Basin and outflow tables: the in-memory contract with the geometry
//! provider.
//!
//! File parsing is external; callers hand over fully constructed tables.
//! Each basin carries its nesting bounds (H1, H2), whose containment
//! relation encodes "basin B drains into basin A", plus optional string
//! attributes used by the coarse-resolution pair filter.

use std::collections::{BTreeMap, HashMap};

use crate::error::SeparationError;
use crate::geometry::{Point, Polygon};

pub type BasinId = i64;

/// Synthetic root identifier: "outside the network".
pub const SENTINEL: BasinId = -1;

/// A catchment polygon with its position in the drainage hierarchy.
#[derive(Clone, Debug)]
pub struct Basin {
    pub id: BasinId,
    /// Lower nesting bound.
    pub h1: f64,
    /// Upper nesting bound, `h1 <= h2`.
    pub h2: f64,
    pub polygon: Polygon,
    /// Attribute columns, e.g. a coarser-resolution grouping code.
    pub attrs: HashMap<String, String>,
}

impl Basin {
    pub fn new(id: BasinId, h1: f64, h2: f64, polygon: Polygon) -> Self {
        Self {
            id,
            h1,
            h2,
            polygon,
            attrs: HashMap::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Width of the nesting interval.
    pub fn span(&self) -> f64 {
        self.h2 - self.h1
    }

    /// Containment of nesting intervals. The upper bound is exclusive, so
    /// an interval never nests inside itself.
    pub fn nests_inside(&self, other: &Basin) -> bool {
        self.h1 >= other.h1 && self.h2 < other.h2
    }

    /// Whether the nesting intervals overlap at all (open intervals).
    pub fn bounds_overlap(&self, other: &Basin) -> bool {
        self.h1 < other.h2 && other.h1 < self.h2
    }
}

/// Id-indexed basin collection. Iteration order is ascending by id, which
/// keeps downstream construction deterministic.
#[derive(Clone, Debug, Default)]
pub struct BasinTable {
    basins: BTreeMap<BasinId, Basin>,
}

impl BasinTable {
    pub fn new(basins: Vec<Basin>) -> Result<Self, SeparationError> {
        let mut map = BTreeMap::new();
        for basin in basins {
            let id = basin.id;
            if map.insert(id, basin).is_some() {
                return Err(SeparationError::DuplicateBasin { basin: id });
            }
        }
        Ok(Self { basins: map })
    }

    pub fn get(&self, id: BasinId) -> Option<&Basin> {
        self.basins.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Basin> {
        self.basins.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = BasinId> + '_ {
        self.basins.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.basins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basins.is_empty()
    }

    /// Attribute value of a basin, if the basin and the attribute exist.
    pub fn attribute(&self, id: BasinId, name: &str) -> Option<&str> {
        self.basins
            .get(&id)
            .and_then(|b| b.attrs.get(name))
            .map(String::as_str)
    }
}

/// Id-indexed outflow points. May cover only a subset of the basins;
/// missing entries fall back to the basin centroid during integration.
#[derive(Clone, Debug, Default)]
pub struct OutflowTable {
    points: BTreeMap<BasinId, Point>,
}

impl OutflowTable {
    pub fn new(points: Vec<(BasinId, Point)>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    pub fn get(&self, id: BasinId) -> Option<Point> {
        self.points.get(&id).copied()
    }

    pub fn insert(&mut self, id: BasinId, point: Point) {
        self.points.insert(id, point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basin(id: BasinId, h1: f64, h2: f64) -> Basin {
        Basin::new(id, h1, h2, Polygon::rectangle(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn nesting_is_strict() {
        let outer = basin(1, 0.0, 10.0);
        let inner = basin(2, 1.0, 5.0);
        assert!(inner.nests_inside(&outer));
        assert!(!outer.nests_inside(&inner));
        assert!(!outer.nests_inside(&outer));
        // shared upper bound does not nest
        let flush = basin(3, 5.0, 10.0);
        assert!(!flush.nests_inside(&outer));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = BasinTable::new(vec![basin(7, 0.0, 1.0), basin(7, 2.0, 3.0)]).unwrap_err();
        assert!(matches!(err, SeparationError::DuplicateBasin { basin: 7 }));
    }

    #[test]
    fn attribute_lookup() {
        let table =
            BasinTable::new(vec![basin(1, 0.0, 1.0).with_attr("region", "north")]).unwrap();
        assert_eq!(table.attribute(1, "region"), Some("north"));
        assert_eq!(table.attribute(1, "missing"), None);
        assert_eq!(table.attribute(2, "region"), None);
    }
}
