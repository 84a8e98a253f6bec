//! Worker-pool query engine.
//!
//! A batch is cut into contiguous chunks, one per worker at most. Every
//! worker searches the same shared index and reports `(offset, positions)`;
//! chunks finish in any order and are stitched back together by offset.
//! Any failing chunk fails the whole batch and no partial result escapes.

use super::QueryEngine;
use crate::compute::spatial::NearestNeighbor;
use crate::error::{GeocodeError, Result};
use crate::store::ReferenceStore;
use crate::{Coordinate, ExecutionMode};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc;

/// What one worker hands back for its chunk.
#[derive(Debug)]
pub struct ChunkResult {
    /// Position of the chunk's first query in the batch.
    pub offset: usize,
    /// Number of queries in the chunk.
    pub len: usize,
    pub outcome: Result<Vec<usize>>,
}

/// Fixed-size worker pool over a shared, read-only index.
pub struct ParallelEngine {
    index: Arc<dyn NearestNeighbor>,
    store: Arc<ReferenceStore>,
    pool: ThreadPool,
    workers: usize,
}

impl ParallelEngine {
    /// Start a pool of `workers` threads. The pool lives as long as the engine.
    pub fn new(
        index: Arc<dyn NearestNeighbor>,
        store: Arc<ReferenceStore>,
        workers: usize,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(GeocodeError::Config(
                "Worker count must be greater than zero".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("revgeo-worker-{}", i))
            .build()
            .map_err(|e| {
                GeocodeError::WorkerFailure(format!("Failed to start worker pool: {}", e))
            })?;

        log::debug!("Started parallel query engine with {} workers", workers);

        Ok(Self {
            index,
            store,
            pool,
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    fn run_chunks(&self, batch: &[Coordinate], chunks: &[Range<usize>]) -> Vec<ChunkResult> {
        let (tx, rx) = mpsc::channel();
        let index = &self.index;

        self.pool.scope(|scope| {
            for range in chunks {
                let tx = tx.clone();
                let chunk = &batch[range.clone()];
                let offset = range.start;

                scope.spawn(move |_| {
                    let search = AssertUnwindSafe(|| index.nearest_batch(chunk));
                    let outcome = panic::catch_unwind(search).unwrap_or_else(|payload| {
                        Err(GeocodeError::WorkerFailure(format!(
                            "Worker for chunk at offset {} panicked: {}",
                            offset,
                            panic_message(payload.as_ref())
                        )))
                    });

                    // The receiver outlives the scope, so this cannot fail.
                    let _ = tx.send(ChunkResult {
                        offset,
                        len: chunk.len(),
                        outcome,
                    });
                });
            }
        });

        drop(tx);
        rx.into_iter().collect()
    }
}

impl QueryEngine for ParallelEngine {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Parallel
    }

    fn store(&self) -> &ReferenceStore {
        &self.store
    }

    fn query_indices(&self, batch: &[Coordinate]) -> Result<Vec<usize>> {
        let chunks = plan_chunks(batch.len(), self.workers);
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!(
            "Dispatching {} queries across {} of {} workers",
            batch.len(),
            chunks.len(),
            self.workers
        );

        let results = self.run_chunks(batch, &chunks);
        reassemble(batch.len(), chunks.len(), results)
    }
}

/// Split `len` queries into at most `workers` contiguous, non-empty chunks
/// whose sizes differ by at most one.
///
/// ```
/// use revgeo::engine::plan_chunks;
///
/// assert_eq!(plan_chunks(10, 3), vec![0..4, 4..7, 7..10]);
/// assert_eq!(plan_chunks(2, 8), vec![0..1, 1..2]);
/// assert!(plan_chunks(0, 4).is_empty());
/// ```
pub fn plan_chunks(len: usize, workers: usize) -> Vec<Range<usize>> {
    let count = len.min(workers.max(1));
    if count == 0 {
        return Vec::new();
    }

    let base = len / count;
    let extra = len % count;
    let mut chunks = Vec::with_capacity(count);
    let mut start = 0;

    for i in 0..count {
        let size = base + usize::from(i < extra);
        chunks.push(start..start + size);
        start += size;
    }

    chunks
}

/// Rebuild the batch-ordered positions from chunk results received in any order.
///
/// Fails if any chunk failed (the error of the lowest-offset failing chunk is
/// reported, with positions made batch-relative), or if the chunks do not tile
/// `0..total` exactly.
pub fn reassemble(
    total: usize,
    expected_chunks: usize,
    mut results: Vec<ChunkResult>,
) -> Result<Vec<usize>> {
    if results.len() != expected_chunks {
        return Err(GeocodeError::WorkerFailure(format!(
            "Only {} of {} workers returned a result",
            results.len(),
            expected_chunks
        )));
    }

    results.sort_by_key(|r| r.offset);

    let mut out = Vec::with_capacity(total);
    for result in results {
        let ChunkResult {
            offset,
            len,
            outcome,
        } = result;

        let positions = outcome.map_err(|e| e.offset_position(offset))?;

        if offset != out.len() || positions.len() != len {
            return Err(GeocodeError::WorkerFailure(format!(
                "Chunk at offset {} returned {} results for {} queries",
                offset,
                positions.len(),
                len
            )));
        }
        out.extend(positions);
    }

    if out.len() != total {
        return Err(GeocodeError::WorkerFailure(format!(
            "Reassembled {} results for a batch of {}",
            out.len(),
            total
        )));
    }

    Ok(out)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
