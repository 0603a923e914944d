//! Run command
//!
//! Submits one job, polls both strategies until done, writes
//! `sequential.<ext>` and `parallel.<ext>` and reports the speedup.

use crate::RunArgs;
use anyhow::{bail, Context, Result};
use std::fs;
use std::thread;
use std::time::Duration;
use tracing::{info, trace};
use twinfx_compute::Strategy;

pub fn run(args: RunArgs, workers: Option<usize>) -> Result<()> {
    trace!(input = %args.job.input.display(), filter = %args.job.filter, "run::run");

    let registry = super::registry(super::config(workers, Some(&args.job)))?;
    let threads = args.threads.unwrap_or_else(|| registry.config().max_threads());
    let bytes = super::load_bytes(&args.job.input)?;

    let id = registry.open();
    let ticket = super::submit(&registry, id, &args.job, bytes, threads, args.format)?;
    info!(
        filter = %ticket.filter,
        intensity = ticket.intensity,
        regions = ticket.region_count,
        "job started"
    );

    let interval = Duration::from_millis(args.poll_ms.max(1));
    loop {
        let seq = registry.progress(id, Strategy::Sequential)?;
        let par = registry.progress(id, Strategy::Parallel)?;
        info!(
            sequential = %super::ms(seq.duration),
            parallel = %super::ms(par.duration),
            regions_done = par.completed,
            regions = par.total,
            "progress"
        );
        if seq.done && par.done {
            break;
        }
        thread::sleep(interval);
    }
    let timing = super::wait_both(&registry, id)?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    for strategy in Strategy::ALL {
        let poll = registry.poll(id, strategy)?;
        let image = poll.image.context("no output produced")?;
        let path = args
            .output
            .join(format!("{}.{}", strategy.name(), args.format.extension()));
        fs::write(&path, image).with_context(|| format!("Failed to save: {}", path.display()))?;
        let duration = match strategy {
            Strategy::Sequential => timing.sequential,
            Strategy::Parallel => timing.parallel,
        };
        println!("{:<10} {:>14}  -> {}", strategy.name(), super::ms(duration), path.display());
    }
    println!("regions    {:>14}", ticket.region_count);
    println!("speedup    {:>13.2}x", timing.speedup());

    if args.verify {
        let seq = registry.snapshot(id, Strategy::Sequential)?;
        let par = registry.snapshot(id, Strategy::Parallel)?;
        if seq != par {
            bail!("sequential and parallel outputs differ");
        }
        println!("verify     outputs identical");
    }

    registry.close(id)?;
    Ok(())
}
