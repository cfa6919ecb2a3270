//! Network-event collaborators consumed by the sampling query.
//!
//! This module is composed of:
//! - `event`: labelled events with discrete choices and a conditional probability table.
//! - `table`: the conditional probability table and its random draw.
//! - `graph`: the network that owns events and keeps them in topological order.
//! - `spec`: serde description used to build a network from JSON or YAML.

mod event;
mod graph;
mod spec;
mod table;

pub use event::{BOOLEAN_CHOICES, BayesianEvent, EventId};
pub use graph::BayesianNetwork;
pub use spec::{EventSpec, LineSpec, NetworkSpec};
pub use table::{EventTable, TableLine};

use crate::error::InferenceError;
use rand::Rng;
use std::fmt;

/// Read-only capabilities an event state needs from the variable it tracks.
///
/// `Display` provides the identity rendered in diagnostic strings.
pub trait NetworkEvent: fmt::Display {
    fn label(&self) -> &str;

    /// True when the event has exactly two categories.
    fn is_boolean(&self) -> bool;

    /// Draws a value consistent with the event's table given the parents' values.
    fn generate_random<R: Rng + ?Sized>(
        &self,
        parents: &[f64],
        rng: &mut R,
    ) -> Result<f64, InferenceError>;
}
