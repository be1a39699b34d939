//! Containment-derived drainage hierarchy.
//!
//! The nesting bounds (H1, H2) of the basin table form a laminar family:
//! any two intervals are disjoint or one strictly contains the other.
//! Under that precondition the widest remaining interval at any level can
//! never be a proper sub-interval of another remaining one, so greedily
//! selecting it as the next direct child and recursing into its contents
//! reconstructs the drainage forest. Construction is iterative with an
//! explicit work stack, so depth is bounded by input size rather than by
//! the call stack.

use std::collections::HashMap;

use crate::basin::{BasinId, BasinTable, SENTINEL};
use crate::error::SeparationError;

/// Parent and children maps over basin identifiers, rooted at [`SENTINEL`].
/// Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
    parent: HashMap<BasinId, BasinId>,
    children: HashMap<BasinId, Vec<BasinId>>,
}

/// Candidate entry while building: (id, h1, h2).
type Candidate = (BasinId, f64, f64);

impl Hierarchy {
    /// Build the hierarchy from the nesting bounds of a basin table.
    ///
    /// Fails fast with [`SeparationError::CrossingBounds`] when the bounds
    /// are not laminar. Ties on interval span are broken toward the lowest
    /// basin identifier, which makes child order deterministic.
    pub fn build(table: &BasinTable) -> Result<Self, SeparationError> {
        validate_laminar(table)?;

        let mut parent = HashMap::with_capacity(table.len());
        let mut children: HashMap<BasinId, Vec<BasinId>> =
            HashMap::with_capacity(table.len() + 1);
        children.insert(SENTINEL, Vec::new());

        // BasinTable iterates ascending by id, so with a strict "wider
        // than" comparison the first maximum is the lowest id.
        let all: Vec<Candidate> = table.iter().map(|b| (b.id, b.h1, b.h2)).collect();
        let mut stack: Vec<(BasinId, Vec<Candidate>)> = vec![(SENTINEL, all)];

        while let Some((node, mut remaining)) = stack.pop() {
            children.entry(node).or_default();
            while !remaining.is_empty() {
                let mut best = 0;
                for (i, c) in remaining.iter().enumerate().skip(1) {
                    if c.2 - c.1 > remaining[best].2 - remaining[best].1 {
                        best = i;
                    }
                }
                let (child, h1, h2) = remaining.remove(best);
                parent.insert(child, node);
                if let Some(list) = children.get_mut(&node) {
                    list.push(child);
                }

                let mut inner = Vec::new();
                let mut rest = Vec::new();
                for c in remaining {
                    if c.1 >= h1 && c.2 < h2 {
                        inner.push(c);
                    } else {
                        rest.push(c);
                    }
                }
                stack.push((child, inner));
                remaining = rest;
            }
        }

        Ok(Self { parent, children })
    }

    /// Parent of a basin; `None` for unknown ids. Top-level basins map to
    /// [`SENTINEL`].
    pub fn parent(&self, id: BasinId) -> Option<BasinId> {
        self.parent.get(&id).copied()
    }

    /// Direct children of a basin or of [`SENTINEL`], widest first.
    pub fn children(&self, id: BasinId) -> &[BasinId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent_map(&self) -> &HashMap<BasinId, BasinId> {
        &self.parent
    }

    /// Number of basins in the hierarchy (the sentinel not counted).
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

/// Pairwise laminar check: every overlapping pair of intervals must be in
/// a strict containment relation. O(n²), same order as construction.
fn validate_laminar(table: &BasinTable) -> Result<(), SeparationError> {
    let basins: Vec<_> = table.iter().collect();
    for (i, a) in basins.iter().enumerate() {
        for b in basins.iter().skip(i + 1) {
            if a.bounds_overlap(b) && !a.nests_inside(b) && !b.nests_inside(a) {
                return Err(SeparationError::CrossingBounds { a: a.id, b: b.id });
            }
        }
    }
    Ok(())
}
