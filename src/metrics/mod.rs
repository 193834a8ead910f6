//! Metrics and observability
//!
//! Atomic counters per manager, mirrored to the `metrics` facade.

mod counters;

pub use counters::*;
