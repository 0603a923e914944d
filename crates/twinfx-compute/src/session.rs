//! Session service for transport front ends.
//!
//! A [`SessionRegistry`] owns one [`WorkerPool`] shared by every session and
//! a codec used to decode submissions and encode polled results. Each session
//! has its own [`JobController`], so concurrent clients never see each
//! other's images.

use crate::config::ComputeConfig;
use crate::job::{JobController, JobTicket, Progress, Strategy};
use crate::pool::WorkerPool;
use crate::{ComputeError, ComputeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, trace};
use twinfx_core::{ColorSpace, ContainerFormat, ImageCodec, PixelBuffer};
use twinfx_ops::{Filter, DEFAULT_INTENSITY, INTENSITY_MAX, INTENSITY_MIN};

/// Opaque session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One job submission.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Encoded image (any container the codec reads).
    pub bytes: Vec<u8>,
    /// Filter name, case-insensitive.
    pub filter: String,
    /// User intensity.
    pub intensity: i32,
    /// Parallel task count.
    pub threads: usize,
    /// Working color space.
    pub color_space: ColorSpace,
    /// Container for polled images.
    pub format: ContainerFormat,
}

/// Answer to a poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollResponse {
    /// Strategy finished.
    pub done: bool,
    /// Final or running duration in milliseconds.
    pub duration_ms: f64,
    /// Encoded current output; absent before the first submission.
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

/// Filter entry in [`Capabilities`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterInfo {
    /// Canonical name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Whether intensity changes the result.
    pub uses_intensity: bool,
}

/// What this service can do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// The filter catalog.
    pub filters: Vec<FilterInfo>,
    /// Largest accepted thread count.
    pub max_threads: usize,
    /// Worker pool size.
    pub workers: usize,
    /// Lowest intensity.
    pub intensity_min: i32,
    /// Highest intensity.
    pub intensity_max: i32,
    /// Intensity used when none is given.
    pub default_intensity: i32,
    /// Working color spaces.
    pub color_spaces: Vec<&'static str>,
    /// Container formats.
    pub formats: Vec<&'static str>,
}

struct Session {
    controller: JobController,
    format: Mutex<ContainerFormat>,
}

/// Sessions keyed by [`SessionId`] over one shared pool.
pub struct SessionRegistry {
    pool: Arc<WorkerPool>,
    codec: Arc<dyn ImageCodec>,
    config: ComputeConfig,
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Starts a pool of `config.workers` threads.
    pub fn new(config: ComputeConfig, codec: Arc<dyn ImageCodec>) -> ComputeResult<Self> {
        let pool = Arc::new(WorkerPool::new(config.workers)?);
        Ok(Self::with_pool(pool, codec, config))
    }

    /// Registry over an existing pool.
    pub fn with_pool(
        pool: Arc<WorkerPool>,
        codec: Arc<dyn ImageCodec>,
        config: ComputeConfig,
    ) -> Self {
        Self {
            pool,
            codec,
            config,
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    /// The shared pool.
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Opens an empty session.
    pub fn open(&self) -> SessionId {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let controller = JobController::new(Arc::clone(&self.pool))
            .with_options(self.config.filter_options())
            .with_split_axis(self.config.split_axis);
        let session = Arc::new(Session {
            controller,
            format: Mutex::new(ContainerFormat::default()),
        });
        self.lock().insert(id, session);
        info!(session = %id, "session opened");
        id
    }

    /// Closes a session. Tasks already queued still finish.
    pub fn close(&self, id: SessionId) -> ComputeResult<()> {
        if self.lock().remove(&id).is_none() {
            return Err(ComputeError::UnknownSession(id.0));
        }
        info!(session = %id, "session closed");
        Ok(())
    }

    /// Open sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no session is open.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Decodes the submission and starts both strategies.
    pub fn submit(&self, id: SessionId, request: SubmitRequest) -> ComputeResult<JobTicket> {
        trace!(
            session = %id,
            filter = %request.filter,
            intensity = request.intensity,
            threads = request.threads,
            bytes = request.bytes.len(),
            "submit"
        );
        let session = self.session(id)?;
        let filter: Filter = request.filter.parse()?;
        let max = self.config.max_threads();
        if request.threads == 0 || request.threads > max {
            return Err(ComputeError::invalid_argument(format!(
                "thread count {} outside 1..={max}",
                request.threads
            )));
        }

        let source = self
            .codec
            .decode(&request.bytes, request.color_space)
            .map_err(ComputeError::Codec)?;
        debug!(session = %id, width = source.width(), height = source.height(), "decoded");

        *lock(&session.format) = request.format;
        session
            .controller
            .process_with(source, filter, request.intensity, request.threads)
    }

    /// Done flag, duration and encoded current output of `strategy`.
    pub fn poll(&self, id: SessionId, strategy: Strategy) -> ComputeResult<PollResponse> {
        let session = self.session(id)?;
        let progress = session.controller.progress(strategy);
        let format = *lock(&session.format);
        let image = session.controller.image(strategy, self.codec.as_ref(), format)?;
        Ok(PollResponse {
            done: progress.done,
            duration_ms: progress.duration.as_secs_f64() * 1e3,
            image,
        })
    }

    /// Progress of `strategy` without encoding an image.
    pub fn progress(&self, id: SessionId, strategy: Strategy) -> ComputeResult<Progress> {
        Ok(self.session(id)?.controller.progress(strategy))
    }

    /// Raw pixels of `strategy`'s current output.
    pub fn snapshot(
        &self,
        id: SessionId,
        strategy: Strategy,
    ) -> ComputeResult<Option<PixelBuffer>> {
        Ok(self.session(id)?.controller.snapshot(strategy))
    }

    /// Blocks until `strategy` of the session's latest run is done.
    pub fn wait(&self, id: SessionId, strategy: Strategy) -> ComputeResult<bool> {
        Ok(self.session(id)?.controller.wait(strategy))
    }

    /// Catalog and limits.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            filters: Filter::ALL
                .iter()
                .map(|f| FilterInfo {
                    name: f.name(),
                    description: f.description(),
                    uses_intensity: f.uses_intensity(),
                })
                .collect(),
            max_threads: self.config.max_threads(),
            workers: self.pool.size(),
            intensity_min: INTENSITY_MIN,
            intensity_max: INTENSITY_MAX,
            default_intensity: DEFAULT_INTENSITY,
            color_spaces: ColorSpace::ALL.iter().map(|c| c.name()).collect(),
            formats: ContainerFormat::ALL.iter().map(|f| f.extension()).collect(),
        }
    }

    fn session(&self, id: SessionId) -> ComputeResult<Arc<Session>> {
        self.lock()
            .get(&id)
            .cloned()
            .ok_or(ComputeError::UnknownSession(id.0))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<Session>>> {
        lock(&self.sessions)
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .field("sessions", &self.len())
            .finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
