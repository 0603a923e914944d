//! CLI command implementations

pub mod filters;
pub mod run;
pub mod sweep;

use crate::JobArgs;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use twinfx_compute::{ComputeConfig, JobTicket, SessionId, SessionRegistry, Strategy, SubmitRequest};
use twinfx_core::ContainerFormat;
use twinfx_io::ImageRsCodec;

/// Environment config with CLI overrides applied.
pub fn config(workers: Option<usize>, job: Option<&JobArgs>) -> ComputeConfig {
    let mut config = ComputeConfig::from_env();
    if let Some(w) = workers.filter(|&w| w > 0) {
        config.workers = w;
    }
    if let Some(job) = job {
        if let Some(axis) = job.split {
            config.split_axis = axis;
        }
        if let Some(mode) = job.edge {
            config.edge_mode = mode;
        }
    }
    config
}

/// Registry over the `image` codec.
pub fn registry(config: ComputeConfig) -> Result<SessionRegistry> {
    SessionRegistry::new(config, Arc::new(ImageRsCodec::new()))
        .context("Failed to start worker pool")
}

/// Reads the input file as raw container bytes.
pub fn load_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Submits one job on `id`.
pub fn submit(
    registry: &SessionRegistry,
    id: SessionId,
    job: &JobArgs,
    bytes: Vec<u8>,
    threads: usize,
    format: ContainerFormat,
) -> Result<JobTicket> {
    registry
        .submit(
            id,
            SubmitRequest {
                bytes,
                filter: job.filter.clone(),
                intensity: job.intensity,
                threads,
                color_space: job.color_space,
                format,
            },
        )
        .with_context(|| format!("Failed to start {} with {threads} threads", job.filter))
}

/// Final durations of one comparison.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub sequential: Duration,
    pub parallel: Duration,
}

impl Timing {
    /// Sequential over parallel wall time.
    pub fn speedup(&self) -> f64 {
        let par = self.parallel.as_secs_f64();
        if par > 0.0 {
            self.sequential.as_secs_f64() / par
        } else {
            f64::INFINITY
        }
    }
}

/// Blocks until both strategies of `id` are done and reads their durations.
pub fn wait_both(registry: &SessionRegistry, id: SessionId) -> Result<Timing> {
    for s in Strategy::ALL {
        registry.wait(id, s)?;
    }
    Ok(Timing {
        sequential: registry.progress(id, Strategy::Sequential)?.duration,
        parallel: registry.progress(id, Strategy::Parallel)?.duration,
    })
}

/// Milliseconds with three decimals.
pub fn ms(d: Duration) -> String {
    format!("{:.3} ms", d.as_secs_f64() * 1e3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speedup() {
        let t = Timing {
            sequential: Duration::from_millis(300),
            parallel: Duration::from_millis(100),
        };
        assert!((t.speedup() - 3.0).abs() < 1e-9);
        let instant = Timing {
            sequential: Duration::from_millis(1),
            parallel: Duration::ZERO,
        };
        assert!(instant.speedup().is_infinite());
    }

    #[test]
    fn test_ms_format() {
        assert_eq!(ms(Duration::from_micros(1500)), "1.500 ms");
    }
}
