use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use crate::{PoolError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Queue and shutdown flag, guarded together by one lock so workers
/// always see a consistent "has work or should stop" snapshot.
struct Shared {
    queue: VecDeque<Job>,
    stop: bool,
}

struct Inner {
    shared: Mutex<Shared>,
    work_available: Condvar,
}

/// A fixed-size pool of worker threads consuming jobs from a shared
/// FIFO queue.
///
/// Workers are spawned at construction and live until [`shutdown`]
/// (or drop). Shutdown drains the queue: jobs already submitted still
/// run before the workers exit. A job that panics is caught, logged,
/// and does not terminate its worker.
///
/// [`shutdown`]: WorkerPool::shutdown
pub struct WorkerPool {
    inner: Arc<Inner>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Creates a pool with the given number of worker threads.
    ///
    /// All workers are spawned before this returns. If spawning fails
    /// partway, the already-spawned workers are stopped and joined
    /// before the error is surfaced, so no threads leak.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ZeroWorkers`] if `workers` is zero, or an
    /// IO error if a worker thread cannot be created.
    pub fn new(workers: u32) -> Result<Self> {
        if workers == 0 {
            return Err(PoolError::ZeroWorkers);
        }

        let inner = Arc::new(Inner {
            shared: Mutex::new(Shared {
                queue: VecDeque::new(),
                stop: false,
            }),
            work_available: Condvar::new(),
        });

        let mut handles = Vec::with_capacity(workers as usize);
        for id in 0..workers {
            match spawn_worker(id, Arc::clone(&inner)) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!("Failed to spawn worker {id}: {e}");
                    let mut partial = WorkerPool {
                        inner,
                        workers: handles,
                    };
                    partial.shutdown();
                    return Err(e.into());
                }
            }
        }

        Ok(WorkerPool {
            inner,
            workers: handles,
        })
    }

    /// Creates a pool with one worker per logical CPU.
    ///
    /// # Errors
    ///
    /// Returns an IO error if a worker thread cannot be created.
    pub fn with_default_workers() -> Result<Self> {
        Self::new(num_cpus::get() as u32)
    }

    /// Submits a job to the pool.
    ///
    /// The job is appended to the queue and one idle worker is woken.
    /// Jobs are dequeued in submission order; completion order across
    /// workers is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Stopped`] if shutdown has begun. The job
    /// is dropped without running.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut shared = self.inner.shared.lock().expect("pool lock poisoned");
            if shared.stop {
                return Err(PoolError::Stopped);
            }
            shared.queue.push_back(Box::new(job));
        }
        self.inner.work_available.notify_one();
        Ok(())
    }

    /// Stops the pool and blocks until every worker has exited.
    ///
    /// Jobs already in the queue still run before the workers exit;
    /// only new submissions are rejected. Safe to call more than once:
    /// later calls find no handles left to join and return immediately.
    ///
    /// Dropping the pool invokes this implicitly.
    pub fn shutdown(&mut self) {
        {
            let mut shared = self.inner.shared.lock().expect("pool lock poisoned");
            shared.stop = true;
        }
        // Every worker must observe the flag for itself.
        self.inner.work_available.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("Worker thread exited by panic");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns a single worker thread running the pull-execute loop.
fn spawn_worker(id: u32, inner: Arc<Inner>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("pool-worker-{id}"))
        .spawn(move || worker_loop(id, &inner))
}

fn worker_loop(id: u32, inner: &Inner) {
    loop {
        let job = {
            let mut shared = inner.shared.lock().expect("pool lock poisoned");
            loop {
                // Queue first: stop still drains what was queued.
                if let Some(job) = shared.queue.pop_front() {
                    break job;
                }
                if shared.stop {
                    debug!("Worker {id}: stop requested, exiting");
                    return;
                }
                shared = inner
                    .work_available
                    .wait(shared)
                    .expect("pool lock poisoned");
            }
        };

        debug!("Worker {id} executing job");
        // Catch panics so the worker loop continues
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!("Worker {id} job panicked, continuing");
        }
    }
}
