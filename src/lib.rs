#![deny(missing_docs)]

//! A fixed-size worker thread pool with graceful, draining shutdown.
//!
//! A [`WorkerPool`] owns a fixed set of long-lived worker threads that
//! pull jobs from a shared FIFO queue. Shutting the pool down drains
//! every job that was already queued before the workers exit, and a
//! job that panics is caught and logged without taking its worker
//! thread down with it.

mod error;
mod pool;

pub use error::{PoolError, Result};
pub use pool::WorkerPool;
