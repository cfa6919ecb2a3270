//! Query-time state for sampling-based inference.
//!
//! - `sample`: per-sample [`EventState`] records and the rejection-sampling query.
//! - `expression`: canonical probability-expression rendering (`+A`, `B=2.0`, `P(+A|-B)`).

pub mod expression;
pub mod sample;

pub use expression::{problem_string, to_simple_string};
pub use sample::{EventState, QueryOutcome, SamplingQuery};

use core::fmt;
use serde::{Deserialize, Serialize};

/// Role an event plays in the current query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRole {
    /// Known value supplied by the query.
    Evidence,
    /// Unknown value whose probability the query asks for.
    Outcome,
    /// Sampled, but not part of the query.
    #[default]
    Hidden,
}

impl EventRole {
    pub const ALL: [EventRole; 3] = [EventRole::Evidence, EventRole::Outcome, EventRole::Hidden];

    pub const fn is_tested(self) -> bool {
        !matches!(self, EventRole::Hidden)
    }
}

impl fmt::Display for EventRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventRole::Evidence => "Evidence",
            EventRole::Outcome => "Outcome",
            EventRole::Hidden => "Hidden",
        };
        f.write_str(label)
    }
}
