//! Job controller: one filter, two execution strategies.
//!
//! Every [`JobController::process`] call creates a fresh run with its own
//! output buffers. The sequential strategy is a single whole-image task; the
//! parallel strategy is one task per planned region. Both go through the same
//! [`WorkerPool`] and are tracked independently.
//!
//! # Completion
//!
//! Each strategy counts finished units with one atomic `fetch_add`. The task
//! that sees the post-increment value equal the unit count stamps the end
//! time, sets the done flag and wakes waiters. Failed or panicking units still
//! count, so a run always completes.
//!
//! ```rust
//! use std::sync::Arc;
//! use twinfx_compute::{JobController, Strategy, WorkerPool};
//! use twinfx_core::{ColorSpace, PixelBuffer};
//! use twinfx_ops::Filter;
//!
//! let pool = Arc::new(WorkerPool::new(3).unwrap());
//! let jobs = JobController::new(pool);
//! jobs.load(PixelBuffer::filled(16, 9, ColorSpace::Rgb, &[10, 20, 30]).unwrap());
//!
//! jobs.process(Filter::Negative, 0, 2).unwrap();
//! assert!(jobs.wait(Strategy::Sequential));
//! assert!(jobs.wait(Strategy::Parallel));
//! assert_eq!(
//!     jobs.snapshot(Strategy::Sequential),
//!     jobs.snapshot(Strategy::Parallel)
//! );
//! ```

use crate::pool::{panic_message, WorkerPool};
use crate::timer::JobTimer;
use crate::{ComputeError, ComputeResult};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};
use twinfx_core::{
    plan_along, ContainerFormat, ImageCodec, OutputBuffer, PixelBuffer, Region, SplitAxis,
};
use twinfx_ops::{Filter, FilterOptions};

/// Execution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One whole-image task.
    Sequential,
    /// One task per region.
    Parallel,
}

impl Strategy {
    /// Both strategies.
    pub const ALL: [Strategy; 2] = [Self::Sequential, Self::Parallel];

    /// Lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ComputeError;

    fn from_str(s: &str) -> ComputeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" | "serial" => Ok(Self::Sequential),
            "parallel" | "par" | "multithread" => Ok(Self::Parallel),
            other => Err(ComputeError::invalid_argument(format!("unknown strategy '{other}'"))),
        }
    }
}

/// Lifecycle of one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing processed yet.
    Idle,
    /// Units still outstanding.
    Running,
    /// Every unit finished.
    Done,
}

/// Handle returned by [`JobController::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTicket {
    /// Monotonic run number within this controller.
    pub run_id: u64,
    /// Filter being applied.
    pub filter: Filter,
    /// Intensity as passed in.
    pub intensity: i32,
    /// Parallel tasks dispatched.
    pub region_count: usize,
}

/// Point-in-time view of one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// All units finished.
    pub done: bool,
    /// Final duration if done, elapsed so far otherwise.
    pub duration: Duration,
    /// Units finished.
    pub completed: usize,
    /// Units dispatched.
    pub total: usize,
}

impl Progress {
    const IDLE: Progress = Progress {
        done: false,
        duration: Duration::ZERO,
        completed: 0,
        total: 0,
    };

    /// Finished fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Output and completion state of one strategy within a run.
struct Lane {
    output: OutputBuffer,
    timer: JobTimer,
    completed: AtomicUsize,
    total: usize,
    done: AtomicBool,
}

impl Lane {
    fn new(source: &PixelBuffer, total: usize) -> Self {
        Self {
            output: OutputBuffer::like(source),
            timer: JobTimer::start(),
            completed: AtomicUsize::new(0),
            total,
            done: AtomicBool::new(false),
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            done: self.done.load(Ordering::Acquire),
            duration: self.timer.elapsed(),
            completed: self.completed.load(Ordering::Acquire).min(self.total),
            total: self.total,
        }
    }
}

struct Run {
    id: u64,
    filter: Filter,
    intensity: i32,
    options: FilterOptions,
    source: Arc<PixelBuffer>,
    regions: Vec<Region>,
    sequential: Lane,
    parallel: Lane,
    signal: Mutex<()>,
    finished: Condvar,
}

impl Run {
    fn new(
        id: u64,
        filter: Filter,
        intensity: i32,
        options: FilterOptions,
        source: Arc<PixelBuffer>,
        regions: Vec<Region>,
    ) -> Self {
        Self {
            id,
            filter,
            intensity,
            options,
            sequential: Lane::new(&source, 1),
            parallel: Lane::new(&source, regions.len()),
            source,
            regions,
            signal: Mutex::new(()),
            finished: Condvar::new(),
        }
    }

    fn lane(&self, strategy: Strategy) -> &Lane {
        match strategy {
            Strategy::Sequential => &self.sequential,
            Strategy::Parallel => &self.parallel,
        }
    }

    fn execute(&self, strategy: Strategy, region: Region) {
        let lane = self.lane(strategy);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.filter
                .apply(&self.source, region, self.intensity, &self.options, &lane.output)
        }));
        match outcome {
            Ok(Ok(())) => trace!(run = self.id, %strategy, %region, "unit finished"),
            Ok(Err(e)) => warn!(
                run = self.id,
                %strategy,
                %region,
                error = %e,
                "filter failed; region left blank"
            ),
            Err(payload) => error!(
                run = self.id,
                %strategy,
                %region,
                "filter panicked: {}",
                panic_message(payload.as_ref())
            ),
        }
    }

    fn finish_unit(&self, strategy: Strategy) {
        let lane = self.lane(strategy);
        let finished = lane.completed.fetch_add(1, Ordering::AcqRel) + 1;
        if finished != lane.total {
            return;
        }
        lane.timer.stop();
        lane.done.store(true, Ordering::Release);
        info!(
            run = self.id,
            filter = %self.filter,
            %strategy,
            ms = lane.timer.elapsed().as_secs_f64() * 1e3,
            "strategy done"
        );
        // taking the lock orders the flag before any waiter's re-check
        drop(self.lock_signal());
        self.finished.notify_all();
    }

    fn lock_signal(&self) -> MutexGuard<'_, ()> {
        self.signal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait(&self, strategy: Strategy, timeout: Option<Duration>) -> bool {
        let lane = self.lane(strategy);
        let guard = self.lock_signal();
        let pending = |_: &mut ()| !lane.done.load(Ordering::Acquire);
        match timeout {
            None => drop(
                self.finished
                    .wait_while(guard, pending)
                    .unwrap_or_else(PoisonError::into_inner),
            ),
            Some(t) => drop(
                self.finished
                    .wait_timeout_while(guard, t, pending)
                    .unwrap_or_else(PoisonError::into_inner),
            ),
        }
        lane.done.load(Ordering::Acquire)
    }
}

/// One dispatched task. Counts toward its lane when dropped, run or not, so
/// a queue discarded by the pool still completes the run.
struct Unit {
    run: Arc<Run>,
    strategy: Strategy,
    region: Region,
    ran: bool,
}

impl Unit {
    fn new(run: &Arc<Run>, strategy: Strategy, region: Region) -> Self {
        Self {
            run: Arc::clone(run),
            strategy,
            region,
            ran: false,
        }
    }

    fn execute(mut self) {
        self.run.execute(self.strategy, self.region);
        self.ran = true;
    }
}

impl Drop for Unit {
    fn drop(&mut self) {
        if !self.ran {
            warn!(
                run = self.run.id,
                strategy = %self.strategy,
                region = %self.region,
                "unit dropped before running; region left blank"
            );
        }
        self.run.finish_unit(self.strategy);
    }
}

/// Runs one filter both sequentially and in parallel over a loaded source.
pub struct JobController {
    pool: Arc<WorkerPool>,
    options: FilterOptions,
    split_axis: SplitAxis,
    source: Mutex<Option<Arc<PixelBuffer>>>,
    current: Mutex<Option<Arc<Run>>>,
    dispatch: Mutex<()>,
    next_id: AtomicU64,
}

impl JobController {
    /// Controller dispatching onto `pool`, default options.
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self {
            pool,
            options: FilterOptions::default(),
            split_axis: SplitAxis::default(),
            source: Mutex::new(None),
            current: Mutex::new(None),
            dispatch: Mutex::new(()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Controller with `source` already loaded.
    pub fn with_source(pool: Arc<WorkerPool>, source: PixelBuffer) -> Self {
        let jobs = Self::new(pool);
        jobs.load(source);
        jobs
    }

    /// Sets filter options for later runs.
    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets stripe orientation for later runs.
    pub fn with_split_axis(mut self, axis: SplitAxis) -> Self {
        self.split_axis = axis;
        self
    }

    /// Replaces the source image. Runs in flight keep the old one.
    pub fn load(&self, source: PixelBuffer) {
        debug!(
            width = source.width(),
            height = source.height(),
            color_space = %source.color_space(),
            "load source"
        );
        let _dispatch = lock(&self.dispatch);
        *lock(&self.source) = Some(Arc::new(source));
    }

    /// The loaded source, if any.
    pub fn source(&self) -> Option<Arc<PixelBuffer>> {
        lock(&self.source).clone()
    }

    /// The shared pool.
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Like [`process`](Self::process), resolving the filter by name.
    pub fn process_named(
        &self,
        filter: &str,
        intensity: i32,
        thread_count: usize,
    ) -> ComputeResult<JobTicket> {
        let filter: Filter = filter.parse()?;
        self.process(filter, intensity, thread_count)
    }

    /// Starts a new run and returns once every task is queued.
    ///
    /// Fails before touching any state when `thread_count` is zero or no
    /// source is loaded.
    pub fn process(
        &self,
        filter: Filter,
        intensity: i32,
        thread_count: usize,
    ) -> ComputeResult<JobTicket> {
        trace!(%filter, intensity, thread_count, "process");
        check_thread_count(thread_count)?;
        let _dispatch = lock(&self.dispatch);
        let source = self
            .source()
            .ok_or_else(|| ComputeError::invalid_argument("no source image loaded"))?;
        self.start(source, filter, intensity, thread_count)
    }

    /// Loads `source` and starts a run on it as one step.
    ///
    /// Concurrent callers never see a run paired with another caller's image.
    /// On error the previous source stays loaded.
    pub fn process_with(
        &self,
        source: PixelBuffer,
        filter: Filter,
        intensity: i32,
        thread_count: usize,
    ) -> ComputeResult<JobTicket> {
        trace!(%filter, intensity, thread_count, "process_with");
        check_thread_count(thread_count)?;
        let _dispatch = lock(&self.dispatch);
        self.start(Arc::new(source), filter, intensity, thread_count)
    }

    /// Caller holds `dispatch`.
    fn start(
        &self,
        source: Arc<PixelBuffer>,
        filter: Filter,
        intensity: i32,
        thread_count: usize,
    ) -> ComputeResult<JobTicket> {
        let (width, height) = (source.width(), source.height());
        let regions = plan_along(width, height, thread_count, self.split_axis)?;
        if self.pool.is_stopping() {
            return Err(ComputeError::PoolStopped);
        }

        if thread_count + 1 > self.pool.size() {
            warn!(
                thread_count,
                pool = self.pool.size(),
                "more tasks than workers; parallel timing will queue"
            );
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let run = Arc::new(Run::new(
            id,
            filter,
            intensity,
            self.options,
            Arc::clone(&source),
            regions,
        ));
        *lock(&self.source) = Some(source);
        *lock(&self.current) = Some(Arc::clone(&run));

        let ticket = JobTicket {
            run_id: run.id,
            filter,
            intensity,
            region_count: run.regions.len(),
        };
        info!(
            run = run.id,
            %filter,
            intensity,
            regions = ticket.region_count,
            axis = %self.split_axis,
            "dispatch"
        );

        let mut units = Vec::with_capacity(run.regions.len() + 1);
        units.push(Unit::new(&run, Strategy::Sequential, run.source.bounds()));
        units.extend(
            run.regions
                .iter()
                .map(|&region| Unit::new(&run, Strategy::Parallel, region)),
        );
        // units left in the vector on early return count themselves on drop
        for unit in units {
            debug!(run = run.id, strategy = %unit.strategy, region = %unit.region, "enqueue");
            self.pool.enqueue(move || unit.execute())?;
        }
        Ok(ticket)
    }

    fn current(&self) -> Option<Arc<Run>> {
        lock(&self.current).clone()
    }

    /// Ticket of the latest run.
    pub fn ticket(&self) -> Option<JobTicket> {
        self.current().map(|run| JobTicket {
            run_id: run.id,
            filter: run.filter,
            intensity: run.intensity,
            region_count: run.regions.len(),
        })
    }

    /// Regions of the latest run (0 before the first run).
    pub fn region_count(&self) -> usize {
        self.current().map_or(0, |run| run.regions.len())
    }

    /// Regions of the latest run.
    pub fn regions(&self) -> Vec<Region> {
        self.current().map(|run| run.regions.clone()).unwrap_or_default()
    }

    /// Lifecycle state of `strategy` in the latest run.
    pub fn state(&self, strategy: Strategy) -> RunState {
        match self.current() {
            None => RunState::Idle,
            Some(run) if run.lane(strategy).done.load(Ordering::Acquire) => RunState::Done,
            Some(_) => RunState::Running,
        }
    }

    /// True once every unit of `strategy` finished.
    pub fn done(&self, strategy: Strategy) -> bool {
        self.state(strategy) == RunState::Done
    }

    /// Frozen duration if done, elapsed so far otherwise; zero when idle.
    pub fn duration(&self, strategy: Strategy) -> Duration {
        self.progress(strategy).duration
    }

    /// Done flag, duration and unit counts of `strategy`.
    pub fn progress(&self, strategy: Strategy) -> Progress {
        self.current()
            .map_or(Progress::IDLE, |run| run.lane(strategy).progress())
    }

    /// Copy of the current output of `strategy`, possibly partial.
    pub fn snapshot(&self, strategy: Strategy) -> Option<PixelBuffer> {
        self.current().map(|run| run.lane(strategy).output.snapshot())
    }

    /// Encoded [`snapshot`](Self::snapshot).
    pub fn image(
        &self,
        strategy: Strategy,
        codec: &dyn ImageCodec,
        format: ContainerFormat,
    ) -> ComputeResult<Option<Vec<u8>>> {
        let Some(pixels) = self.snapshot(strategy) else {
            return Ok(None);
        };
        codec
            .encode(&pixels, format)
            .map(Some)
            .map_err(ComputeError::Codec)
    }

    /// Blocks until `strategy` of the latest run is done.
    ///
    /// Returns false immediately when nothing was processed.
    pub fn wait(&self, strategy: Strategy) -> bool {
        self.current().is_some_and(|run| run.wait(strategy, None))
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    pub fn wait_timeout(&self, strategy: Strategy, timeout: Duration) -> bool {
        self.current()
            .is_some_and(|run| run.wait(strategy, Some(timeout)))
    }
}

impl fmt::Debug for JobController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobController")
            .field("pool", &self.pool.size())
            .field("options", &self.options)
            .field("split_axis", &self.split_axis)
            .field("ticket", &self.ticket())
            .finish()
    }
}

fn check_thread_count(thread_count: usize) -> ComputeResult<()> {
    if thread_count == 0 {
        return Err(ComputeError::invalid_argument("thread count must be at least 1"));
    }
    Ok(())
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
