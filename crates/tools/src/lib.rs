//! lablib tools library

pub mod common;
pub mod config;
pub mod filter;

pub use common::{read_trace, write_trace, Trace, TraceFormat};
pub use config::FilterSpec;
pub use filter::{run, FilterArgs, FilterReport};
