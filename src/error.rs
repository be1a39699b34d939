//! Error taxonomy for the separation engine.
//!
//! Precondition violations and data inconsistencies fail fast and carry the
//! offending basin identifiers; empty inputs are valid and never errors.

use thiserror::Error;

use crate::basin::BasinId;
use crate::geometry::Point;

#[derive(Debug, Error)]
pub enum SeparationError {
    /// Nesting bounds are not a laminar family: two intervals overlap
    /// without one strictly containing the other.
    #[error("nesting bounds of basins {a} and {b} cross; input is not a laminar family")]
    CrossingBounds { a: BasinId, b: BasinId },

    #[error("duplicate basin identifier {basin}")]
    DuplicateBasin { basin: BasinId },

    /// A basin has neither an outflow point nor a computable centroid.
    #[error("basin {basin} has neither an outflow point nor a computable centroid")]
    MissingGeometry { basin: BasinId },

    #[error("unknown basin identifier {basin}")]
    UnknownBasin { basin: BasinId },

    #[error("separation of basin {basin} with itself is undefined")]
    SelfPair { basin: BasinId },

    /// The integrated paths of a pair stopped at different points even
    /// though they share a common ancestor inside the network. This is a
    /// hierarchy/geometry inconsistency, never silently summed.
    #[error(
        "paths of basins {a} and {b} stop {gap} apart instead of meeting \
         at the outflow of their common ancestor {lca}"
    )]
    MeetingPointMismatch {
        a: BasinId,
        b: BasinId,
        lca: BasinId,
        point_a: Point,
        point_b: Point,
        gap: f64,
    },

    #[error("basin {basin} has no attribute {attr:?}")]
    UnknownAttribute { basin: BasinId, attr: String },
}
