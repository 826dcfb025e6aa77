//! Parallel, order-preserving execution of per-row work.
//!
//! Per-record matching has no cross-row dependencies, so it can be chunked and spread over a
//! rayon pool. The engine adds:
//!
//! - bounded in-flight chunks (throttling)
//! - live metrics and observer hooks
//!
//! Output order always equals input order, whatever the thread count or chunk size.

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

use semaphore::Semaphore;

use crate::error::{ReconError, ReconResult};

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of rows per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks, on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl ExecutionOptions {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> ReconResult<()> {
        let problem = if self.chunk_size == 0 {
            "chunk_size must be > 0"
        } else if self.max_in_flight_chunks == 0 {
            "max_in_flight_chunks must be > 0"
        } else if self.num_threads == Some(0) {
            "num_threads must be > 0 when set"
        } else {
            return Ok(());
        };
        Err(ReconError::InvalidExecution {
            message: problem.to_string(),
        })
    }
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n,
        }
    }
}

/// A rayon-backed engine for row-independent work.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`ReconError::InvalidExecution`] if `chunk_size == 0`,
    /// `max_in_flight_chunks == 0`, `num_threads == Some(0)`, or the thread pool cannot be
    /// spawned.
    pub fn new(opts: ExecutionOptions) -> ReconResult<Self> {
        opts.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or_else(available_threads))
            .build()
            .map_err(|e| ReconError::InvalidExecution {
                message: format!("failed to build thread pool: {e}"),
            })?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Apply `f` to every item in parallel; `out[i] == f(&items[i])`.
    pub fn map_parallel<T, U, F>(&self, items: &[T], f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Send + Sync,
    {
        self.pool.install(|| self.map_parallel_impl(items, &f))
    }

    fn map_parallel_impl<T, U, F>(&self, items: &[T], f: &F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Send + Sync,
    {
        let start = Instant::now();
        let ranges = chunk_ranges(items.len(), self.opts.chunk_size);
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            items: items.len(),
            chunks: ranges.len(),
        });

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let per_chunk: Vec<Vec<U>> = ranges
            .into_par_iter()
            .map(|range| {
                let permit = sem.acquire();
                if permit.waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(permit.waited);
                    self.emit(ExecutionEvent::ThrottleWaited {
                        duration: permit.waited,
                    });
                }

                self.metrics.on_chunk_start();
                self.emit(ExecutionEvent::ChunkStarted {
                    start: range.start,
                    len: range.len(),
                });

                let chunk_start = range.start;
                let out: Vec<U> = items[range].iter().map(f).collect();

                self.metrics.on_chunk_end(out.len());
                self.emit(ExecutionEvent::ChunkFinished { start: chunk_start });
                drop(permit);
                out
            })
            .collect();

        let out: Vec<U> = per_chunk.into_iter().flatten().collect();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });
        out
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn chunk_ranges(len: usize, chunk_size: usize) -> Vec<Range<usize>> {
    (0..len)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(len))
        .collect()
}
