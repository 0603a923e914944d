//! Fixed-size worker pool over a FIFO task queue.
//!
//! Workers sleep on a condition variable while the queue is empty and wake
//! one per enqueued task. Tasks run outside the queue lock.
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use twinfx_compute::pool::{ShutdownMode, WorkerPool};
//!
//! let pool = WorkerPool::new(2).unwrap();
//! let hits = Arc::new(AtomicUsize::new(0));
//! for _ in 0..8 {
//!     let hits = Arc::clone(&hits);
//!     pool.enqueue(move || {
//!         hits.fetch_add(1, Ordering::Relaxed);
//!     })
//!     .unwrap();
//! }
//! pool.shutdown(ShutdownMode::Drain);
//! assert_eq!(hits.load(Ordering::Relaxed), 8);
//! ```

use crate::{ComputeError, ComputeResult};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, trace};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// What happens to queued tasks on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownMode {
    /// Run every task already queued, then stop.
    #[default]
    Drain,
    /// Drop queued tasks; only tasks already running finish.
    Discard,
}

struct Queue {
    tasks: VecDeque<Task>,
    stopping: Option<ShutdownMode>,
}

struct Shared {
    queue: Mutex<Queue>,
    available: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        // tasks never run under this lock, so a poisoned guard is still consistent
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// N persistent OS threads pulling tasks from one queue.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Spawns `workers` threads named `twinfx-worker-{i}`.
    pub fn new(workers: usize) -> ComputeResult<Self> {
        if workers == 0 {
            return Err(ComputeError::invalid_argument("worker pool needs at least one thread"));
        }
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                tasks: VecDeque::new(),
                stopping: None,
            }),
            available: Condvar::new(),
        });

        let pool = Self {
            shared,
            workers: Mutex::new(Vec::with_capacity(workers)),
            size: workers,
        };
        for index in 0..workers {
            let shared = Arc::clone(&pool.shared);
            let spawned = thread::Builder::new()
                .name(format!("twinfx-worker-{index}"))
                .spawn(move || worker_loop(&shared, index));
            match spawned {
                Ok(handle) => pool.handles().push(handle),
                Err(e) => {
                    pool.shutdown(ShutdownMode::Discard);
                    return Err(ComputeError::WorkerSpawn(e.to_string()));
                }
            }
        }
        info!(workers, "worker pool started");
        Ok(pool)
    }

    /// Appends a task and wakes one idle worker.
    ///
    /// Returns [`ComputeError::PoolStopped`] once shutdown has begun; the task
    /// is dropped unrun.
    pub fn enqueue<F>(&self, task: F) -> ComputeResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut queue = self.shared.lock();
        if queue.stopping.is_some() {
            return Err(ComputeError::PoolStopped);
        }
        queue.tasks.push_back(Box::new(task));
        trace!(pending = queue.tasks.len(), "enqueue");
        drop(queue);
        self.shared.available.notify_one();
        Ok(())
    }

    /// Stops the pool and joins every worker. Later calls are no-ops.
    pub fn shutdown(&self, mode: ShutdownMode) {
        let discarded = {
            let mut queue = self.shared.lock();
            if queue.stopping.is_none() {
                queue.stopping = Some(mode);
            }
            match mode {
                ShutdownMode::Discard => std::mem::take(&mut queue.tasks),
                ShutdownMode::Drain => VecDeque::new(),
            }
        };
        if !discarded.is_empty() {
            debug!(count = discarded.len(), "discarding queued tasks");
        }
        drop(discarded);
        self.shared.available.notify_all();

        let handles = std::mem::take(&mut *self.handles());
        let current = thread::current().id();
        for handle in handles {
            // a task dropping the last pool handle cannot join its own thread
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                error!("worker thread exited abnormally");
            }
        }
    }

    /// Number of worker threads.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tasks queued but not yet picked up.
    pub fn pending(&self) -> usize {
        self.shared.lock().tasks.len()
    }

    /// True once shutdown has begun.
    pub fn is_stopping(&self) -> bool {
        self.shared.lock().stopping.is_some()
    }

    fn handles(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown(ShutdownMode::Drain);
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("pending", &self.pending())
            .field("stopping", &self.is_stopping())
            .finish()
    }
}

fn worker_loop(shared: &Shared, index: usize) {
    loop {
        let task = {
            let mut queue = shared.lock();
            loop {
                match queue.stopping {
                    Some(ShutdownMode::Discard) => return,
                    Some(ShutdownMode::Drain) if queue.tasks.is_empty() => return,
                    _ => {}
                }
                if let Some(task) = queue.tasks.pop_front() {
                    break task;
                }
                queue = shared
                    .available
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            error!(worker = index, "task panicked: {}", panic_message(payload.as_ref()));
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(ComputeError::InvalidArgument(_))));
    }

    #[test]
    fn test_single_worker_is_fifo() {
        let pool = WorkerPool::new(1).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..20 {
            let order = Arc::clone(&order);
            pool.enqueue(move || order.lock().unwrap().push(i)).unwrap();
        }
        pool.shutdown(ShutdownMode::Drain);
        assert_eq!(*order.lock().unwrap(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_enqueue_after_shutdown() {
        let pool = WorkerPool::new(2).unwrap();
        pool.shutdown(ShutdownMode::Drain);
        assert!(pool.is_stopping());
        assert!(matches!(pool.enqueue(|| {}), Err(ComputeError::PoolStopped)));
        pool.shutdown(ShutdownMode::Discard);
    }

    #[test]
    fn test_discard_drops_queued() {
        let pool = WorkerPool::new(1).unwrap();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        pool.enqueue(move || {
            started_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        })
        .unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let ran = Arc::clone(&ran);
            pool.enqueue(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        assert_eq!(pool.pending(), 5);

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).unwrap();
        });
        pool.shutdown(ShutdownMode::Discard);
        releaser.join().unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn test_panicking_task_keeps_worker() {
        let pool = WorkerPool::new(1).unwrap();
        pool.enqueue(|| panic!("boom")).unwrap();
        let (tx, rx) = mpsc::channel();
        pool.enqueue(move || tx.send(7).unwrap()).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    }

    #[test]
    fn test_drop_drains() {
        let ran = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(3).unwrap();
            for _ in 0..50 {
                let ran = Arc::clone(&ran);
                pool.enqueue(move || {
                    ran.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
            }
        }
        assert_eq!(ran.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_worker_names() {
        let pool = WorkerPool::new(2).unwrap();
        let (tx, rx) = mpsc::channel();
        pool.enqueue(move || {
            tx.send(thread::current().name().map(str::to_string)).unwrap();
        })
        .unwrap();
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
        assert!(name.starts_with("twinfx-worker-"));
        assert_eq!(pool.size(), 2);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
    }
}
