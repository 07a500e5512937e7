//! Post-normalization stages: correlation against the buffer, then filtering.

pub mod correlator;
pub mod filter;

pub use correlator::{Correlation, correlate, merge_data};
pub use filter::Filter;
