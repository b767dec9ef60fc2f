//! Recursive (IIR) digital filtering of real traces

use crate::buffer::{LookbackRing, SampleArray};
use crate::{CoreError, Result};
use tracing::debug;

/// Generic filter trait
pub trait Filter {
    /// Filter a trace in place
    fn apply_in_place(&self, trace: &mut [f64]) -> Result<()>;

    /// Filter `input` into `output`, leaving `input` untouched
    fn apply_into(&self, input: &[f64], output: &mut [f64]) -> Result<()> {
        if input.len() != output.len() {
            return Err(CoreError::BufferSizeMismatch {
                expected: input.len(),
                actual: output.len(),
            });
        }

        output.copy_from_slice(input);
        self.apply_in_place(output)
    }
}

/// Direct-form recursive filter with real coefficients.
///
/// Produces `y[n] = sum_j x[n-j] * xcoeff[j] + sum_k y[n-k-1] * ycoeff[k]`.
/// The first [`warmup`](Self::warmup) samples have too little history and
/// are passed through unchanged. Traces no longer than either coefficient
/// vector, or any trace when `xcoeff` is empty, pass through entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct RecursiveFilter {
    xcoeff: Vec<f64>, // Feedforward coefficients
    ycoeff: Vec<f64>, // Feedback coefficients
}

impl RecursiveFilter {
    /// Create a filter from feed-forward and feedback coefficients
    pub fn new(xcoeff: Vec<f64>, ycoeff: Vec<f64>) -> Self {
        Self { xcoeff, ycoeff }
    }

    /// Create a filter from shaped coefficient arrays, which must be 1-D
    pub fn from_arrays(xcoeff: &SampleArray, ycoeff: &SampleArray) -> Result<Self> {
        let xcoeff = xcoeff.as_1d("xcoeff")?.to_vec();
        let ycoeff = ycoeff.as_1d("ycoeff")?.to_vec();
        Ok(Self::new(xcoeff, ycoeff))
    }

    /// A pure feed-forward filter (finite causal convolution)
    pub fn feed_forward(xcoeff: Vec<f64>) -> Self {
        Self::new(xcoeff, Vec::new())
    }

    pub fn xcoeff(&self) -> &[f64] {
        &self.xcoeff
    }

    pub fn ycoeff(&self) -> &[f64] {
        &self.ycoeff
    }

    /// Number of past samples the filter looks at
    pub fn order(&self) -> usize {
        self.warmup()
    }

    /// Index of the first sample that gets filtered
    pub fn warmup(&self) -> usize {
        warmup(&self.xcoeff, &self.ycoeff)
    }

    /// Whether a trace of `len` samples is returned unchanged
    pub fn is_passthrough(&self, len: usize) -> bool {
        self.passthrough_reason(len).is_some()
    }

    /// Why a trace of `len` samples would be returned unchanged, if it would
    pub fn passthrough_reason(&self, len: usize) -> Option<&'static str> {
        passthrough_reason(len, &self.xcoeff, &self.ycoeff)
    }

    /// Filter a copy of `trace` and return it
    pub fn apply(&self, trace: &[f64]) -> Result<Vec<f64>> {
        let mut output = try_copy(trace)?;
        run(&mut output, &self.xcoeff, &self.ycoeff)?;
        Ok(output)
    }
}

impl Filter for RecursiveFilter {
    fn apply_in_place(&self, trace: &mut [f64]) -> Result<()> {
        run(trace, &self.xcoeff, &self.ycoeff)
    }
}

/// Filter `trace` in place.
///
/// Slices are flat by construction, so no shape check is done here. The
/// coefficients are only read. Mutable access to `trace` is exclusive for
/// the whole pass.
pub fn iir_apply_in_place(trace: &mut [f64], xcoeff: &[f64], ycoeff: &[f64]) -> Result<()> {
    run(trace, xcoeff, ycoeff)
}

/// Apply a digital, possibly recursive, filter and return the filtered trace.
///
/// All three inputs must be one-dimensional; anything else fails with
/// [`CoreError::InvalidShape`] before any work is done. The result is a
/// newly allocated vector of the same length as `trace`; the caller's
/// trace is never modified.
///
/// ```
/// use lablib_core::{buffer::SampleArray, iir_apply};
///
/// let trace = SampleArray::from(vec![1.0, 0.0, 0.0, 0.0, 0.0]);
/// let xcoeff = SampleArray::from(vec![1.0]);
/// let ycoeff = SampleArray::from(vec![0.5]);
///
/// let filtered = iir_apply(&trace, &xcoeff, &ycoeff).unwrap();
/// assert_eq!(filtered, vec![1.0, 0.5, 0.25, 0.125, 0.0625]);
/// ```
pub fn iir_apply(trace: &SampleArray, xcoeff: &SampleArray, ycoeff: &SampleArray) -> Result<Vec<f64>> {
    let trace = trace.as_1d("trace")?;
    let xcoeff = xcoeff.as_1d("xcoeff")?;
    let ycoeff = ycoeff.as_1d("ycoeff")?;

    let mut output = try_copy(trace)?;
    run(&mut output, xcoeff, ycoeff)?;
    Ok(output)
}

fn warmup(xcoeff: &[f64], ycoeff: &[f64]) -> usize {
    xcoeff.len().saturating_sub(1).max(ycoeff.len())
}

fn passthrough_reason(len: usize, xcoeff: &[f64], ycoeff: &[f64]) -> Option<&'static str> {
    if xcoeff.is_empty() {
        Some("no feed-forward coefficients")
    } else if xcoeff.len() >= len {
        Some("trace not longer than feed-forward coefficients")
    } else if ycoeff.len() >= len {
        Some("trace not longer than feedback coefficients")
    } else {
        None
    }
}

fn try_copy(trace: &[f64]) -> Result<Vec<f64>> {
    let mut output = Vec::new();
    output
        .try_reserve_exact(trace.len())
        .map_err(|_| CoreError::OutOfMemory { requested: trace.len() })?;
    output.extend_from_slice(trace);
    Ok(output)
}

fn run(trace: &mut [f64], xcoeff: &[f64], ycoeff: &[f64]) -> Result<()> {
    let len = trace.len();
    if let Some(reason) = passthrough_reason(len, xcoeff, ycoeff) {
        debug!(
            len,
            xcoeff = xcoeff.len(),
            ycoeff = ycoeff.len(),
            reason,
            "filter not applicable, leaving trace unchanged"
        );
        return Ok(());
    }

    let start = warmup(xcoeff, ycoeff);
    debug!(len, start, xcoeff = xcoeff.len(), ycoeff = ycoeff.len(), "applying recursive filter");

    // Raw inputs must survive the overwrite below, so they live in the ring.
    let mut previous = LookbackRing::try_with_capacity(xcoeff.len())?;
    previous.prime(&trace[start + 1 - xcoeff.len()..start]);

    for i in start..len {
        previous.push(trace[i]);
        debug_assert!(previous.is_full());

        let mut acc = 0.0;
        for (value, &coeff) in previous.iter().zip(xcoeff) {
            acc += value * coeff;
        }
        for (k, &coeff) in ycoeff.iter().enumerate() {
            acc += trace[i - k - 1] * coeff;
        }
        trace[i] = acc;
    }

    Ok(())
}
