//! Bounded-concurrency batch runner.
//!
//! Each batch gets its own rayon pool sized to `max_concurrent`, so at most
//! that many jobs are ever in flight. The batch call returns after every job
//! has finished.

use std::panic::{self, AssertUnwindSafe};

use rayon::ThreadPoolBuilder;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, error};

use crate::error::KeggError;

#[derive(Debug, Clone, Copy)]
pub struct FetchEngine {
    max_concurrent: usize,
}

impl FetchEngine {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Runs `job` once per item. Completion order is unspecified. A job that
    /// panics is logged and does not disturb its siblings; nothing else about
    /// job outcomes is observed here. Fails only when the worker pool cannot
    /// be started, in which case no job has run.
    pub fn run<T, F>(&self, items: Vec<T>, job: F) -> Result<(), KeggError>
    where
        T: Send,
        F: Fn(T) + Sync,
    {
        let total = items.len();
        if total == 0 {
            return Ok(());
        }
        debug!(total, max_concurrent = self.max_concurrent, "starting batch");

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.max_concurrent)
            .thread_name(|index| format!("kegg-fetch-{index}"))
            .build()
            .map_err(|err| KeggError::WorkerPool(err.to_string()))?;

        pool.install(|| {
            items.into_par_iter().for_each(|item| {
                if panic::catch_unwind(AssertUnwindSafe(|| job(item))).is_err() {
                    error!("batch job panicked");
                }
            });
        });

        debug!(total, "batch finished");
        Ok(())
    }
}
