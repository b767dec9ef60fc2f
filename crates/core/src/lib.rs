//! lablib core - recursive digital filtering of real traces
//!
//! This crate provides the IIR filter kernel used across lablib, together
//! with the lookback ring buffer it runs on and the shaped sample arrays
//! that carry traces and coefficient vectors in from outside callers.
//!
//! Each filtered sample is
//! `y[n] = sum_j x[n-j] * xcoeff[j] + sum_k y[n-k-1] * ycoeff[k]`.
//! Samples before the warm-up index `max(len(xcoeff) - 1, len(ycoeff))`
//! keep their original values.
//!
//! Filtering is synchronous and keeps no state between calls. Calls on
//! distinct traces are independent and may run on any number of threads.

pub mod buffer;
pub mod error;
pub mod filter;

pub use error::{CoreError, Result};
pub use filter::{iir_apply, iir_apply_in_place, RecursiveFilter};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        buffer::{LookbackRing, SampleArray},
        error::{CoreError, Result},
        filter::{iir_apply, iir_apply_in_place, RecursiveFilter},
    };
}
