//! lab-iir - apply a recursive digital filter to a recorded trace

use anyhow::Result;
use clap::Parser;
use lablib_tools::common::init_logging;
use lablib_tools::{run, FilterArgs};
use tracing::info;

fn main() -> Result<()> {
    let args = FilterArgs::parse();

    init_logging(args.verbose, args.debug);
    info!("lab-iir starting");

    let report = run(&args)?;

    if let Some(output) = &args.output {
        if report.passthrough {
            eprintln!("Trace left unfiltered: {} samples written to {:?}", report.sample_count, output);
        } else {
            eprintln!(
                "✓ Filtered {} samples ({} warm-up) written to {:?}",
                report.sample_count, report.warmup, output
            );
        }
    }

    Ok(())
}
