//! Static 2-D k-d tree for exact nearest-neighbor search.
//!
//! The tree is built once over a fixed point set and is read-only afterwards,
//! so a single instance can be searched from any number of threads.
//!
//! Points are stored as `[lat, lon]`. Interior nodes split at the median of
//! the node's points, alternating latitude and longitude by depth; nodes with
//! at most [`LEAF_SIZE`] points are scanned linearly.
//!
//! Distances are squared Euclidean over raw degrees. Exact ties are resolved
//! in favour of the lowest original index, so a given tree and query always
//! produce the same answer.

use super::{NearestNeighbor, Neighbor};
use crate::Coordinate;
use crate::compute::validation::{coordinate_problem, validate_batch};
use crate::error::{GeocodeError, Result};

/// Maximum number of points in a leaf before it is split.
pub const LEAF_SIZE: usize = 16;

/// Flat node storage; children are indices into `KdTree::nodes`.
#[derive(Debug, Clone)]
enum Node {
    Split {
        dim: usize,
        value: f64,
        left: usize,
        right: usize,
    },
    /// Range `[start, end)` into `points`/`indices`.
    Leaf { start: usize, end: usize },
}

#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<Node>,
    /// Points in tree order.
    points: Vec<[f64; 2]>,
    /// `indices[i]` is the input position of `points[i]`.
    indices: Vec<usize>,
    depth: usize,
}

impl KdTree {
    /// Build a balanced tree over `coords`.
    ///
    /// Positions returned by queries refer to the order of `coords`.
    ///
    /// # Errors
    ///
    /// `EmptyDataset` if `coords` is empty, `InvalidCoordinate` if a point is
    /// not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use revgeo::Coordinate;
    /// use revgeo::compute::spatial::{KdTree, NearestNeighbor};
    ///
    /// let tree = KdTree::build(&[
    ///     Coordinate::new(-33.86785, 151.20732),
    ///     Coordinate::new(51.5074, -0.1278),
    /// ])?;
    ///
    /// let hit = tree.nearest(&Coordinate::new(51.50, -0.12))?;
    /// assert_eq!(hit.index, 1);
    /// # Ok::<(), revgeo::GeocodeError>(())
    /// ```
    pub fn build(coords: &[Coordinate]) -> Result<Self> {
        if coords.is_empty() {
            return Err(GeocodeError::EmptyDataset);
        }

        if let Some(position) = coords.iter().position(|c| !c.is_finite()) {
            return Err(GeocodeError::InvalidCoordinate {
                position,
                reason: format!("Reference point {} is not finite", coords[position]),
            });
        }

        let points: Vec<[f64; 2]> = coords.iter().map(Coordinate::as_array).collect();
        let n = points.len();
        let mut order: Vec<usize> = (0..n).collect();
        let mut nodes = Vec::with_capacity(2 * n.div_ceil(LEAF_SIZE));
        let mut depth = 0;

        build_recursive(&points, &mut order, 0, 0, &mut nodes, &mut depth);

        let tree_points = order.iter().map(|&i| points[i]).collect();

        Ok(Self {
            nodes,
            points: tree_points,
            indices: order,
            depth,
        })
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of split levels from the root to the deepest leaf.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Nearest point to `query`, without validating it.
    fn nearest_unchecked(&self, query: [f64; 2]) -> Neighbor {
        let mut best = Neighbor {
            index: usize::MAX,
            dist_sq: f64::INFINITY,
        };
        self.nearest_recursive(0, &query, &mut best);
        best
    }

    fn nearest_recursive(&self, node_idx: usize, query: &[f64; 2], best: &mut Neighbor) {
        match self.nodes[node_idx] {
            Node::Leaf { start, end } => {
                for i in start..end {
                    let dsq = squared_distance(query, &self.points[i]);
                    let index = self.indices[i];
                    if dsq < best.dist_sq || (dsq == best.dist_sq && index < best.index) {
                        best.dist_sq = dsq;
                        best.index = index;
                    }
                }
            }
            Node::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = query[dim] - value;

                let (near, far) = if query[dim] <= value {
                    (left, right)
                } else {
                    (right, left)
                };

                self.nearest_recursive(near, query, best);

                // `<=` so equally distant points on the far side still compete
                // for the lowest-index tie-break.
                if diff * diff <= best.dist_sq {
                    self.nearest_recursive(far, query, best);
                }
            }
        }
    }
}

impl NearestNeighbor for KdTree {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn nearest(&self, query: &Coordinate) -> Result<Neighbor> {
        if let Some(reason) = coordinate_problem(query) {
            return Err(GeocodeError::InvalidCoordinate {
                position: 0,
                reason,
            });
        }
        Ok(self.nearest_unchecked(query.as_array()))
    }

    fn nearest_batch(&self, queries: &[Coordinate]) -> Result<Vec<usize>> {
        validate_batch(queries)?;
        Ok(queries
            .iter()
            .map(|q| self.nearest_unchecked(q.as_array()).index)
            .collect())
    }
}

/// Builds the subtree over `order[..]`, whose first element sits at absolute
/// position `offset`. Returns the node index of the subtree root.
fn build_recursive(
    points: &[[f64; 2]],
    order: &mut [usize],
    offset: usize,
    level: usize,
    nodes: &mut Vec<Node>,
    max_level: &mut usize,
) -> usize {
    let count = order.len();
    *max_level = (*max_level).max(level);

    if count <= LEAF_SIZE {
        let node_idx = nodes.len();
        nodes.push(Node::Leaf {
            start: offset,
            end: offset + count,
        });
        return node_idx;
    }

    // 0 = latitude, 1 = longitude
    let dim = level % 2;
    let median = count / 2;

    // Ties on the split value are ordered by input position so the layout is
    // reproducible for a given input.
    order.select_nth_unstable_by(median, |&a, &b| {
        points[a][dim].total_cmp(&points[b][dim]).then(a.cmp(&b))
    });
    let value = points[order[median]][dim];

    let node_idx = nodes.len();
    nodes.push(Node::Leaf { start: 0, end: 0 });

    let (lower, upper) = order.split_at_mut(median);
    let left = build_recursive(points, lower, offset, level + 1, nodes, max_level);
    let right = build_recursive(points, upper, offset + median, level + 1, nodes, max_level);

    nodes[node_idx] = Node::Split {
        dim,
        value,
        left,
        right,
    };

    node_idx
}

#[inline]
fn squared_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    d0 * d0 + d1 * d1
}
