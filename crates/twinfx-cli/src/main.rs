//! twinfx - run an image filter sequentially and in parallel, and compare
//!
//! Front end over the session service: submits a job, polls both execution
//! strategies, writes the two results and reports the speedup.

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use twinfx_core::{ColorSpace, ContainerFormat, SplitAxis};
use twinfx_ops::{EdgeMode, DEFAULT_INTENSITY};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "twinfx")]
#[command(author, version, about = "Sequential vs parallel image filtering")]
#[command(long_about = "
Applies one pixel filter twice, as a single whole-image pass and split into
regions over a worker pool, and compares the timings.

Examples:
  twinfx filters                          # List filters and limits
  twinfx filters --json
  twinfx run photo.jpg -f blur -i 8 -t 4  # One comparison
  twinfx run photo.jpg -f negative --color hsv -o out --verify
  twinfx sweep photo.jpg -f median -i 3 --from 1 --to 8
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins when set
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Worker pool size (default: usable hardware threads + 1)
    #[arg(short = 'w', long, global = true)]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// List filters, thread limits and formats
    #[command(visible_alias = "caps")]
    Filters(FiltersArgs),

    /// Run one sequential vs parallel comparison
    Run(RunArgs),

    /// Run the comparison for a range of thread counts
    Sweep(SweepArgs),
}

#[derive(Args)]
struct FiltersArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

/// Options shared by `run` and `sweep`.
#[derive(Args, Clone)]
struct JobArgs {
    /// Input image (jpg, png, bmp, tiff)
    input: PathBuf,

    /// Filter name (see `twinfx filters`)
    #[arg(short, long)]
    filter: String,

    /// Intensity, 0..=20
    #[arg(short, long, default_value_t = DEFAULT_INTENSITY)]
    intensity: i32,

    /// Working color space: rgb, hsv, gray
    #[arg(long = "color", default_value = "rgb")]
    color_space: ColorSpace,

    /// Stripe orientation: longer, rows, columns
    #[arg(long)]
    split: Option<SplitAxis>,

    /// Border policy: fixed, renormalize
    #[arg(long)]
    edge: Option<EdgeMode>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Parallel task count (default: usable hardware threads)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output directory for sequential.<ext> and parallel.<ext>
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Output container
    #[arg(long, default_value = "png")]
    format: ContainerFormat,

    /// Progress poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Fail if the two outputs differ
    #[arg(long)]
    verify: bool,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    job: JobArgs,

    /// First thread count
    #[arg(long, default_value_t = 1)]
    from: usize,

    /// Last thread count (default: usable hardware threads)
    #[arg(long)]
    to: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Filters(args) => commands::filters::run(args, cli.workers),
        Commands::Run(args) => commands::run::run(args, cli.workers),
        Commands::Sweep(args) => commands::sweep::run(args, cli.workers),
    }
}
