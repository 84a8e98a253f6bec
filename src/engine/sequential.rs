use super::QueryEngine;
use crate::compute::spatial::NearestNeighbor;
use crate::error::Result;
use crate::store::ReferenceStore;
use crate::{Coordinate, ExecutionMode};
use std::sync::Arc;

/// Runs every query on the calling thread.
pub struct SequentialEngine {
    index: Arc<dyn NearestNeighbor>,
    store: Arc<ReferenceStore>,
}

impl SequentialEngine {
    pub fn new(index: Arc<dyn NearestNeighbor>, store: Arc<ReferenceStore>) -> Self {
        Self { index, store }
    }
}

impl QueryEngine for SequentialEngine {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Sequential
    }

    fn store(&self) -> &ReferenceStore {
        &self.store
    }

    fn query_indices(&self, batch: &[Coordinate]) -> Result<Vec<usize>> {
        self.index.nearest_batch(batch)
    }
}
