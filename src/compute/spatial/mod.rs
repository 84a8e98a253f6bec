//! Nearest-neighbor search over the reference coordinates.

pub mod kdtree;

pub use kdtree::KdTree;

use crate::Coordinate;
use crate::error::Result;

/// Result of a nearest-neighbor search: input position and squared planar distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub dist_sq: f64,
}

impl Neighbor {
    /// Planar distance in degrees.
    pub fn distance(&self) -> f64 {
        self.dist_sq.sqrt()
    }
}

/// Read-only exact 1-nearest-neighbor search.
///
/// Implementations must be deterministic: the same query always yields the
/// same position, independent of which thread asks.
pub trait NearestNeighbor: Send + Sync {
    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nearest indexed point to `query`.
    fn nearest(&self, query: &Coordinate) -> Result<Neighbor>;

    /// Position of the nearest point for every query, in query order.
    ///
    /// An invalid query fails the whole batch with `InvalidCoordinate`
    /// naming its position.
    fn nearest_batch(&self, queries: &[Coordinate]) -> Result<Vec<usize>>;
}
