#![deny(warnings)]
//! Per-event state tracking for sampling-based inference over Bayesian networks.

pub mod error;
pub mod network;
pub mod query;

pub use error::InferenceError;

/// Tolerance used when comparing drawn values against compare values and table arguments.
pub const DEFAULT_DOUBLE_EQUAL: f64 = 0.000_000_1;
