//! Concurrent execution engine for twinfx.
//!
//! Runs a filter twice over the same source, once as a single whole-image
//! task and once split into region tasks, on one fixed worker pool, and
//! tracks each strategy's completion and timing.
//!
//! # Architecture
//!
//! ```text
//! SessionRegistry (transport-facing)
//!     └── JobController (one per session)
//!             ├── RegionPlanner (twinfx_core::plan_along)
//!             ├── FilterLibrary (twinfx_ops::Filter)
//!             └── WorkerPool (shared)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use twinfx_compute::{JobController, Strategy, WorkerPool};
//! use twinfx_core::{ColorSpace, PixelBuffer};
//!
//! let pool = Arc::new(WorkerPool::new(2).unwrap());
//! let src = PixelBuffer::filled(32, 32, ColorSpace::Grayscale, &[90]).unwrap();
//! let jobs = JobController::with_source(pool, src);
//!
//! let ticket = jobs.process_named("blur", 2, 4).unwrap();
//! assert_eq!(ticket.region_count, 4);
//! jobs.wait(Strategy::Parallel);
//! println!("parallel: {:?}", jobs.duration(Strategy::Parallel));
//! ```

pub mod config;
mod error;
pub mod job;
pub mod pool;
pub mod session;
pub mod timer;

pub use config::{hardware_threads, ComputeConfig};
pub use error::{ComputeError, ComputeResult};
pub use job::{JobController, JobTicket, Progress, RunState, Strategy};
pub use pool::{ShutdownMode, WorkerPool};
pub use session::{
    Capabilities, FilterInfo, PollResponse, SessionId, SessionRegistry, SubmitRequest,
};
pub use timer::JobTimer;
