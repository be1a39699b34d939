//! Generation-expanded ancestry index for lowest-common-ancestor queries.
//!
//! Walking parent pointers on every query would cost O(depth) per basin
//! per pair; with tens of thousands of neighbor pairs that adds up. The
//! index expands every chain once, so LCA queries reduce to a scan of two
//! precomputed chains bounded by tree depth.

use std::collections::HashMap;

use crate::basin::{BasinId, SENTINEL};
use crate::error::SeparationError;
use crate::hierarchy::Hierarchy;

/// Per-basin ancestor chains `[x, parent(x), …, SENTINEL]`. Owns the
/// hierarchy it was expanded from; both are read-only after construction.
#[derive(Clone, Debug)]
pub struct AncestryIndex {
    hierarchy: Hierarchy,
    chains: HashMap<BasinId, Vec<BasinId>>,
}

impl AncestryIndex {
    /// Expand all generations of the parent map.
    pub fn new(hierarchy: Hierarchy) -> Self {
        let mut chains = HashMap::with_capacity(hierarchy.len());
        for (&id, _) in hierarchy.parent_map() {
            let mut chain = vec![id];
            let mut cur = id;
            while cur != SENTINEL {
                cur = hierarchy.parent(cur).unwrap_or(SENTINEL);
                chain.push(cur);
            }
            chains.insert(id, chain);
        }
        Self { hierarchy, chains }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Full ancestor chain of a basin, ending with [`SENTINEL`].
    pub fn chain(&self, id: BasinId) -> Option<&[BasinId]> {
        self.chains.get(&id).map(Vec::as_slice)
    }

    /// Ancestor at a given generation depth; generations past the chain
    /// end stay at [`SENTINEL`].
    pub fn generation(&self, id: BasinId, depth: usize) -> Option<BasinId> {
        self.chains
            .get(&id)
            .map(|chain| chain.get(depth).copied().unwrap_or(SENTINEL))
    }

    /// Lowest common ancestor of two basins: the first entry of `x`'s
    /// chain that occurs anywhere in `y`'s chain. The sentinel is a common
    /// ancestor of everything, so the scan always terminates.
    pub fn lca(&self, x: BasinId, y: BasinId) -> Result<BasinId, SeparationError> {
        let cx = self
            .chain(x)
            .ok_or(SeparationError::UnknownBasin { basin: x })?;
        let cy = self
            .chain(y)
            .ok_or(SeparationError::UnknownBasin { basin: y })?;
        for &candidate in cx {
            if cy.contains(&candidate) {
                return Ok(candidate);
            }
        }
        Ok(SENTINEL)
    }
}
