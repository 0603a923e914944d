//! Sweep command
//!
//! Repeats the comparison for every thread count in a range.

use crate::SweepArgs;
use anyhow::{bail, Result};
use tracing::{debug, trace};
use twinfx_core::ContainerFormat;

pub fn run(args: SweepArgs, workers: Option<usize>) -> Result<()> {
    trace!(input = %args.job.input.display(), filter = %args.job.filter, "sweep::run");

    let registry = super::registry(super::config(workers, Some(&args.job)))?;
    let max = registry.config().max_threads();
    let from = args.from.max(1);
    let to = args.to.unwrap_or(max).min(max);
    if from > to {
        bail!("empty thread range {from}..={to} (max {max})");
    }
    let bytes = super::load_bytes(&args.job.input)?;
    let id = registry.open();

    println!(
        "{:>7} {:>8} {:>16} {:>16} {:>8}",
        "threads", "regions", "sequential", "parallel", "speedup"
    );
    for threads in from..=to {
        let bytes = bytes.clone();
        let ticket =
            super::submit(&registry, id, &args.job, bytes, threads, ContainerFormat::Png)?;
        let timing = super::wait_both(&registry, id)?;
        debug!(threads, ?timing, "sweep step");
        println!(
            "{:>7} {:>8} {:>16} {:>16} {:>7.2}x",
            threads,
            ticket.region_count,
            super::ms(timing.sequential),
            super::ms(timing.parallel),
            timing.speedup()
        );
    }

    registry.close(id)?;
    Ok(())
}
