//! Trace filtering tool

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use lablib_core::filter::Filter;

use crate::common::{parse_coefficients, read_trace, write_text_samples, write_trace};
use crate::config::FilterSpec;

/// Filter tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "lab-iir")]
#[command(about = "Apply a recursive digital filter to a recorded trace")]
#[command(version)]
pub struct FilterArgs {
    /// Input trace (.wav, .json, or whitespace separated text)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output trace; printed to stdout as text when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filter coefficient file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    pub filter: Option<PathBuf>,

    /// Feed-forward coefficients, comma separated; overrides the filter file
    #[arg(short = 'x', long, value_parser = parse_coefficients, allow_hyphen_values = true)]
    pub xcoeff: Option<::std::vec::Vec<f64>>,

    /// Feedback coefficients, comma separated; overrides the filter file
    #[arg(short = 'y', long, value_parser = parse_coefficients, allow_hyphen_values = true)]
    pub ycoeff: Option<::std::vec::Vec<f64>>,

    /// Sample rate for WAV output when the input carries none
    #[arg(long, default_value = "48000")]
    pub sample_rate: u32,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl FilterArgs {
    /// Resolve the coefficients from the filter file and command line
    pub fn filter_spec(&self) -> Result<FilterSpec> {
        let mut spec = match &self.filter {
            Some(path) => FilterSpec::from_file(path)?,
            None => FilterSpec::new(Vec::new(), Vec::new()),
        };

        if let Some(xcoeff) = &self.xcoeff {
            spec.xcoeff = xcoeff.clone();
        }
        if let Some(ycoeff) = &self.ycoeff {
            spec.ycoeff = ycoeff.clone();
        }

        if self.filter.is_none() && self.xcoeff.is_none() {
            anyhow::bail!("Either --filter or --xcoeff must be specified");
        }

        Ok(spec)
    }
}

/// Outcome of one filtering run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub sample_count: usize,
    pub warmup: usize,
    pub passthrough: bool,
}

/// Load the trace, filter it and write the result
pub fn run(args: &FilterArgs) -> Result<FilterReport> {
    let spec = args.filter_spec()?;
    if let Some(name) = &spec.name {
        info!("Using filter {:?}", name);
    }
    debug!(
        "Filter coefficients: xcoeff={:?} ycoeff={:?}",
        spec.xcoeff, spec.ycoeff
    );

    let trace = read_trace(&args.input)?;
    let filter = spec.to_filter();

    let mut samples = trace.samples;
    let reason = filter.passthrough_reason(samples.len());
    let report = FilterReport {
        sample_count: samples.len(),
        warmup: filter.warmup(),
        passthrough: reason.is_some(),
    };
    if let Some(reason) = reason {
        warn!(
            "Filter not applicable to trace of {} samples ({}), leaving it unfiltered",
            samples.len(),
            reason
        );
    }

    filter
        .apply_in_place(&mut samples)
        .context("Failed to filter trace")?;

    match &args.output {
        Some(path) => {
            let sample_rate = trace.sample_rate.unwrap_or(args.sample_rate);
            write_trace(path, &samples, sample_rate)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_text_samples(&mut lock, &samples)?;
        }
    }

    Ok(report)
}
