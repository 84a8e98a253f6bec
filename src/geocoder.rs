//! A fully built reverse geocoder: reference store, spatial index, engine.

use crate::builder::GeocoderBuilder;
use crate::compute::spatial::{KdTree, NearestNeighbor};
use crate::compute::validation::validate_coordinate;
use crate::engine::{ParallelEngine, QueryEngine, SequentialEngine};
use crate::error::{GeocodeError, Result};
use crate::store::ReferenceStore;
use crate::{Coordinate, ExecutionMode, Place, PrecisionTier};
use std::sync::Arc;
use std::time::Instant;

/// One reference dataset indexed and ready to query.
///
/// The store and index are immutable; the engine is chosen at build time and
/// never changes. A `Geocoder` is `Send + Sync` and meant to be shared behind
/// an `Arc`.
///
/// # Examples
///
/// ```rust
/// use revgeo::{Coordinate, ExecutionMode, Geocoder, Place, ReferenceStore};
///
/// let store = ReferenceStore::new(
///     vec![
///         Place::new(Coordinate::new(-33.86785, 151.20732)).with_attribute("name", Some("Sydney")),
///         Place::new(Coordinate::new(51.5074, -0.1278)).with_attribute("name", Some("London")),
///     ],
///     None,
/// );
///
/// let geocoder = Geocoder::build(store, Default::default(), ExecutionMode::Sequential, 1)?;
/// let place = geocoder.nearest(Coordinate::new(-33.86, 151.20))?;
/// assert_eq!(place.get("name"), Some("Sydney"));
/// # Ok::<(), revgeo::GeocodeError>(())
/// ```
pub struct Geocoder {
    tier: PrecisionTier,
    store: Arc<ReferenceStore>,
    index: Arc<KdTree>,
    engine: Box<dyn QueryEngine>,
}

impl Geocoder {
    pub fn builder() -> GeocoderBuilder {
        GeocoderBuilder::new()
    }

    /// Index `store` and set up the engine for `mode`.
    ///
    /// `workers` is only used by the parallel engine.
    pub fn build(
        store: ReferenceStore,
        tier: PrecisionTier,
        mode: ExecutionMode,
        workers: usize,
    ) -> Result<Self> {
        let start = Instant::now();
        let store = Arc::new(store);
        let index = Arc::new(KdTree::build(&store.coordinates())?);

        log::info!(
            "Built k-d tree over {} places ({} tier, depth {}) in {:?}",
            index.len(),
            tier,
            index.depth(),
            start.elapsed()
        );

        let engine: Box<dyn QueryEngine> = match mode {
            ExecutionMode::Sequential => {
                Box::new(SequentialEngine::new(index.clone(), store.clone()))
            }
            ExecutionMode::Parallel => {
                Box::new(ParallelEngine::new(index.clone(), store.clone(), workers)?)
            }
        };

        Ok(Self {
            tier,
            store,
            index,
            engine,
        })
    }

    pub fn mode(&self) -> ExecutionMode {
        self.engine.mode()
    }

    pub fn tier(&self) -> PrecisionTier {
        self.tier
    }

    /// Number of reference places.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    pub fn index(&self) -> &KdTree {
        &self.index
    }

    /// Nearest place for every coordinate of `batch`, in batch order.
    pub fn query(&self, batch: &[Coordinate]) -> Result<Vec<Arc<Place>>> {
        self.engine.query(batch)
    }

    /// Nearest place to a single coordinate.
    pub fn nearest(&self, coord: Coordinate) -> Result<Arc<Place>> {
        validate_coordinate(&coord)?;
        self.engine.query(&[coord])?.pop().ok_or_else(|| {
            GeocodeError::WorkerFailure("Query engine returned no result".to_string())
        })
    }

    /// Nearest place and its planar distance in degrees.
    pub fn nearest_with_distance(&self, coord: Coordinate) -> Result<(Arc<Place>, f64)> {
        validate_coordinate(&coord)?;
        let hit = self.index.nearest(&coord)?;
        let place = self.store.get(hit.index).cloned().ok_or_else(|| {
            GeocodeError::WorkerFailure(format!("No place at index position {}", hit.index))
        })?;
        Ok((place, hit.distance()))
    }
}

impl std::fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geocoder")
            .field("mode", &self.mode())
            .field("tier", &self.tier)
            .field("places", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> ReferenceStore {
        ReferenceStore::new(
            vec![
                Place::new(Coordinate::new(-33.86785, 151.20732))
                    .with_attribute("name", Some("Sydney")),
                Place::new(Coordinate::new(51.5074, -0.1278))
                    .with_attribute("name", Some("London")),
                Place::new(Coordinate::new(35.6895, 139.6917))
                    .with_attribute("name", Some("Tokyo")),
            ],
            None,
        )
    }

    fn build(tier: PrecisionTier, mode: ExecutionMode, workers: usize) -> Geocoder {
        Geocoder::build(cities(), tier, mode, workers).unwrap()
    }

    #[test]
    fn test_empty_store_fails_at_build() {
        let empty = ReferenceStore::new(Vec::new(), None);
        for mode in ExecutionMode::ALL {
            assert!(matches!(
                Geocoder::build(empty.clone(), PrecisionTier::Fine, mode, 2),
                Err(GeocodeError::EmptyDataset)
            ));
        }
    }

    #[test]
    fn test_modes_agree() {
        let sequential = build(PrecisionTier::Fine, ExecutionMode::Sequential, 1);
        let parallel = build(PrecisionTier::Fine, ExecutionMode::Parallel, 2);
        assert_eq!(parallel.mode(), ExecutionMode::Parallel);

        let batch = vec![
            Coordinate::new(-33.86, 151.20),
            Coordinate::new(51.50, -0.12),
            Coordinate::new(36.0, 140.0),
        ];
        assert_eq!(sequential.query(&batch).unwrap(), parallel.query(&batch).unwrap());
    }

    #[test]
    fn test_nearest_with_distance() {
        let geocoder = build(PrecisionTier::Coarse, ExecutionMode::Sequential, 1);
        let (place, distance) = geocoder
            .nearest_with_distance(Coordinate::new(51.5074, -0.1278))
            .unwrap();
        assert_eq!(place.get("name"), Some("London"));
        assert_eq!(distance, 0.0);
        assert_eq!(geocoder.tier(), PrecisionTier::Coarse);
    }

    #[test]
    fn test_nearest_rejects_out_of_range() {
        let geocoder = build(PrecisionTier::Fine, ExecutionMode::Sequential, 1);
        assert!(matches!(
            geocoder.nearest(Coordinate::new(0.0, 200.0)),
            Err(GeocodeError::InvalidInput(_))
        ));
    }
}
