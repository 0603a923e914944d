//! Compute configuration with environment overrides.
//!
//! # Environment Variables
//!
//! - `TWINFX_WORKERS` - Worker pool size
//! - `TWINFX_RESERVED_THREADS` - Hardware threads held back from jobs (default 1)
//! - `TWINFX_SPLIT_AXIS` - `longer`, `rows` or `columns`
//! - `TWINFX_EDGE_MODE` - `fixed` or `renormalize`

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;
use twinfx_core::SplitAxis;
use twinfx_ops::{EdgeMode, FilterOptions};

/// Hardware threads held back by default.
pub const DEFAULT_RESERVED_THREADS: usize = 1;

static HARDWARE_THREADS: OnceLock<usize> = OnceLock::new();

/// Detect logical CPU count.
pub fn hardware_threads() -> usize {
    *HARDWARE_THREADS.get_or_init(|| {
        sys_info::cpu_num()
            .ok()
            .map(|n| n as usize)
            .filter(|&n| n > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    })
}

/// Pool and filter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeConfig {
    /// Worker pool size.
    pub workers: usize,
    /// Hardware threads not offered to jobs.
    pub reserved_threads: usize,
    /// Stripe orientation for parallel runs.
    pub split_axis: SplitAxis,
    /// Border policy for weighted filters.
    pub edge_mode: EdgeMode,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        let reserved_threads = DEFAULT_RESERVED_THREADS;
        Self {
            // one extra worker runs the sequential pass next to the region tasks
            workers: usable_threads(hardware_threads(), reserved_threads) + 1,
            reserved_threads,
            split_axis: SplitAxis::default(),
            edge_mode: EdgeMode::default(),
        }
    }
}

impl ComputeConfig {
    /// Defaults overridden by `TWINFX_*` variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(reserved) = env_parse::<usize>("TWINFX_RESERVED_THREADS") {
            config.reserved_threads = reserved;
            config.workers = usable_threads(hardware_threads(), reserved) + 1;
        }
        if let Some(workers) = env_parse::<usize>("TWINFX_WORKERS").filter(|&w| w > 0) {
            config.workers = workers;
        }
        if let Some(axis) = env_parse::<SplitAxis>("TWINFX_SPLIT_AXIS") {
            config.split_axis = axis;
        }
        if let Some(mode) = env_parse::<EdgeMode>("TWINFX_EDGE_MODE") {
            config.edge_mode = mode;
        }
        config
    }

    /// Largest thread count a job may request.
    pub fn max_threads(&self) -> usize {
        usable_threads(hardware_threads(), self.reserved_threads)
    }

    /// Options handed to every filter call.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            edge_mode: self.edge_mode,
        }
    }

    /// Sets the pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the stripe orientation.
    pub fn with_split_axis(mut self, axis: SplitAxis) -> Self {
        self.split_axis = axis;
        self
    }

    /// Sets the border policy.
    pub fn with_edge_mode(mut self, mode: EdgeMode) -> Self {
        self.edge_mode = mode;
        self
    }
}

/// `max(1, hardware - reserved)`.
#[inline]
pub fn usable_threads(hardware: usize, reserved: usize) -> usize {
    hardware.saturating_sub(reserved).max(1)
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_threads() {
        assert_eq!(usable_threads(8, 1), 7);
        assert_eq!(usable_threads(1, 1), 1);
        assert_eq!(usable_threads(2, 5), 1);
    }

    #[test]
    fn test_default_has_sequential_slot() {
        let config = ComputeConfig::default();
        assert_eq!(config.workers, config.max_threads() + 1);
        assert!(hardware_threads() >= 1);
    }

    #[test]
    fn test_builders() {
        let config = ComputeConfig::default()
            .with_workers(3)
            .with_split_axis(SplitAxis::Rows)
            .with_edge_mode(EdgeMode::Renormalize);
        assert_eq!(config.workers, 3);
        assert_eq!(config.split_axis, SplitAxis::Rows);
        assert_eq!(config.filter_options().edge_mode, EdgeMode::Renormalize);
    }
}
