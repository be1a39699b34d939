//! Hydrological separation analysis for nested catchment polygons.
//!
//! Builds a containment-derived drainage hierarchy from basin nesting
//! bounds, finds spatially adjacent basin pairs, and computes per pair the
//! length of the flow path connecting them through their lowest common
//! ancestor, together with the shared border geometry.

pub mod ancestry;
pub mod basin;
pub mod error;
pub mod flow;
pub mod geometry;
pub mod hierarchy;
pub mod neighbors;
pub mod separation;
pub mod synthetic;
