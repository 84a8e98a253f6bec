//! Query engines: how a batch of coordinates is run against the index.
//!
//! Both engines answer the same contract: one place per query, in query
//! order, or a single error for the whole batch. Which one a registry entry
//! uses is decided once, when the entry is built.

mod parallel;
mod sequential;

pub use parallel::{ChunkResult, ParallelEngine, plan_chunks, reassemble};
pub use sequential::SequentialEngine;

use crate::error::Result;
use crate::store::ReferenceStore;
use crate::{Coordinate, ExecutionMode, Place};
use std::sync::Arc;

pub trait QueryEngine: Send + Sync {
    fn mode(&self) -> ExecutionMode;

    /// The store that index positions resolve against.
    fn store(&self) -> &ReferenceStore;

    /// Index position of the nearest place for each query, in query order.
    fn query_indices(&self, batch: &[Coordinate]) -> Result<Vec<usize>>;

    /// Nearest place for each query, in query order.
    fn query(&self, batch: &[Coordinate]) -> Result<Vec<Arc<Place>>> {
        let indices = self.query_indices(batch)?;
        self.store().resolve(&indices)
    }
}
