//! Filters command
//!
//! Prints the capability listing: filter catalog, thread limits, formats.

use crate::FiltersArgs;
use anyhow::{Context, Result};
use tracing::trace;

pub fn run(args: FiltersArgs, workers: Option<usize>) -> Result<()> {
    trace!(json = args.json, "filters::run");
    let registry = super::registry(super::config(workers, None))?;
    let caps = registry.capabilities();

    if args.json {
        let json = serde_json::to_string_pretty(&caps).context("Failed to serialize capabilities")?;
        println!("{json}");
        return Ok(());
    }

    println!("Filters:");
    for f in &caps.filters {
        let marker = if f.uses_intensity { " " } else { "*" };
        println!("  {marker} {:<22} {}", f.name, f.description);
    }
    println!("  (* ignores intensity)");
    println!();
    println!(
        "Intensity:    {}..={} (default {})",
        caps.intensity_min, caps.intensity_max, caps.default_intensity
    );
    println!("Max threads:  {}", caps.max_threads);
    println!("Workers:      {}", caps.workers);
    println!("Color spaces: {}", caps.color_spaces.join(", "));
    println!("Formats:      {}", caps.formats.join(", "));
    Ok(())
}
