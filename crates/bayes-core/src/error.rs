//! Errors raised by the network collaborator, event states, and the sampling query.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    /// Satisfaction was requested for an event the query does not test.
    #[error("satisfy can't be called on hidden event '{label}'")]
    HiddenSatisfaction { label: String },

    #[error("incomplete logic table for event '{label}'")]
    IncompleteTable { label: String },

    #[error("probabilities for event '{label}' given {arguments:?} sum to {total}, expected 1")]
    InvalidDistribution {
        label: String,
        arguments: Vec<usize>,
        total: f64,
    },

    #[error("invalid table line for event '{label}': {reason}")]
    InvalidLine { label: String, reason: String },

    #[error("event '{label}' is already defined")]
    DuplicateEvent { label: String },

    #[error("invalid event '{label}': {reason}")]
    InvalidEvent { label: String, reason: String },

    #[error("unknown event '{label}'")]
    UnknownEvent { label: String },

    #[error("event '{event}' has no choice '{choice}'")]
    UnknownChoice { event: String, choice: String },

    #[error("invalid dependency {parent} -> {child}: {reason}")]
    InvalidDependency {
        parent: String,
        child: String,
        reason: String,
    },

    #[error("query defines no outcome events")]
    NoOutcome,

    #[error("sample count must be greater than zero")]
    ZeroSamples,

    #[error("network description could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}
