//! Rejection-sampling query over a [`BayesianNetwork`].

mod event_state;

pub use event_state::EventState;

use crate::error::InferenceError;
use crate::network::{BayesianEvent, BayesianNetwork, EventId, NetworkEvent};
use crate::query::{EventRole, expression};
use core::fmt;
use rand::Rng;
use serde::Serialize;
use tracing::{Level, event};

/// Counts and estimate produced by [`SamplingQuery::execute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub problem: String,
    pub samples: usize,
    /// Samples in which every evidence event matched.
    pub usable: usize,
    /// Usable samples in which every outcome event matched too.
    pub good: usize,
    pub probability: f64,
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {:.6} ({} good / {} usable / {} samples)",
            self.problem, self.probability, self.good, self.usable, self.samples
        )
    }
}

/// Estimates `P(outcome | evidence)` by drawing every event front to back and counting the
/// samples that agree with the query.
///
/// Owns one [`EventState`] per network event; states are reset at the start of each sample.
#[derive(Debug)]
pub struct SamplingQuery<'a> {
    network: &'a BayesianNetwork,
    states: Vec<EventState<'a, BayesianEvent>>,
}

impl<'a> SamplingQuery<'a> {
    pub fn new(network: &'a BayesianNetwork) -> Self {
        Self {
            network,
            states: network.events().iter().map(EventState::new).collect(),
        }
    }

    pub fn network(&self) -> &'a BayesianNetwork {
        self.network
    }

    /// States left over from the most recent sample.
    pub fn states(&self) -> &[EventState<'a, BayesianEvent>] {
        &self.states
    }

    pub fn state(&self, id: EventId) -> Option<&EventState<'a, BayesianEvent>> {
        self.states.get(id.index())
    }

    pub fn define_event_type(
        &mut self,
        id: EventId,
        role: EventRole,
    ) -> Result<(), InferenceError> {
        self.state_mut(id)?.set_role(role);
        Ok(())
    }

    /// Sets the queried choice of an evidence or outcome event.
    pub fn set_event_value(
        &mut self,
        id: EventId,
        choice: usize,
    ) -> Result<(), InferenceError> {
        let state = self.state_mut(id)?;
        let event = state.event();
        if choice >= event.choices().len() {
            return Err(InferenceError::UnknownChoice {
                event: event.label().to_string(),
                choice: choice.to_string(),
            });
        }
        state.set_compare_value(choice as f64);
        Ok(())
    }

    /// Sets a raw compare value without checking it against the event's choices.
    pub fn define_event_value(
        &mut self,
        id: EventId,
        value: f64,
    ) -> Result<(), InferenceError> {
        self.state_mut(id)?.set_compare_value(value);
        Ok(())
    }

    /// Puts every event back to `Hidden` so the query can be reused for another problem.
    pub fn reset_roles(&mut self) {
        for state in &mut self.states {
            state.set_role(EventRole::Hidden);
            state.set_compare_value(0.0);
        }
    }

    pub fn problem(&self) -> String {
        expression::problem_string(&self.states)
    }

    pub fn execute<R: Rng + ?Sized>(
        &mut self,
        sample_count: usize,
        rng: &mut R,
    ) -> Result<QueryOutcome, InferenceError> {
        if sample_count == 0 {
            return Err(InferenceError::ZeroSamples);
        }
        if !self
            .states
            .iter()
            .any(|state| state.role() == EventRole::Outcome)
        {
            return Err(InferenceError::NoOutcome);
        }

        let mut usable = 0usize;
        let mut good = 0usize;
        let mut parents = Vec::new();

        for _ in 0..sample_count {
            self.sample_once(rng, &mut parents)?;
            if self.all_satisfied(EventRole::Evidence)? {
                usable += 1;
                if self.all_satisfied(EventRole::Outcome)? {
                    good += 1;
                }
            }
        }

        let probability = if usable == 0 {
            0.0
        } else {
            good as f64 / usable as f64
        };
        let problem = self.problem();

        event!(
            target: "bayes_core::sampling",
            Level::DEBUG,
            problem = %problem,
            samples = sample_count,
            usable,
            good,
            probability,
        );
        if usable == 0 {
            tracing::warn!(
                problem = %problem,
                samples = sample_count,
                "no sample satisfied the evidence; estimate defaults to 0"
            );
        }

        Ok(QueryOutcome {
            problem,
            samples: sample_count,
            usable,
            good,
            probability,
        })
    }

    fn sample_once<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        parents: &mut Vec<f64>,
    ) -> Result<(), InferenceError> {
        for state in &mut self.states {
            state.reset();
        }

        // Events are stored parents-first, so every parent is resolved before its child.
        let network = self.network;
        for (index, event) in network.events().iter().enumerate() {
            parents.clear();
            for parent in event.parents() {
                let parent_state = &self.states[parent.index()];
                debug_assert!(parent_state.is_calculated());
                parents.push(parent_state.value());
            }
            self.states[index].randomize(parents, rng)?;
        }
        Ok(())
    }

    fn all_satisfied(&self, role: EventRole) -> Result<bool, InferenceError> {
        for state in self.states.iter().filter(|state| state.role() == role) {
            if !state.is_satisfied()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn state_mut(
        &mut self,
        id: EventId,
    ) -> Result<&mut EventState<'a, BayesianEvent>, InferenceError> {
        self.states
            .get_mut(id.index())
            .ok_or_else(|| InferenceError::UnknownEvent {
                label: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    /// `A -> B` with `P(A) = 0.3`, `P(B | A) = 0.8`, `P(B | !A) = 0.1`.
    fn two_node() -> BayesianNetwork {
        let mut network = BayesianNetwork::new();
        let a = network.create_boolean_event("A").unwrap();
        let b = network.create_boolean_event("B").unwrap();
        network.create_dependency(a, b).unwrap();

        let event_a = network.event_mut(a).unwrap();
        event_a.add_line(0.7, 0, &[]).unwrap();
        event_a.add_line(0.3, 1, &[]).unwrap();

        let event_b = network.event_mut(b).unwrap();
        event_b.add_line(0.9, 0, &[0]).unwrap();
        event_b.add_line(0.1, 1, &[0]).unwrap();
        event_b.add_line(0.2, 0, &[1]).unwrap();
        event_b.add_line(0.8, 1, &[1]).unwrap();

        network.validate().unwrap();
        network
    }

    fn posterior_query(network: &BayesianNetwork) -> SamplingQuery<'_> {
        let a = network.require("A").unwrap();
        let b = network.require("B").unwrap();
        let mut query = SamplingQuery::new(network);
        query.define_event_type(a, EventRole::Outcome).unwrap();
        query.set_event_value(a, 1).unwrap();
        query.define_event_type(b, EventRole::Evidence).unwrap();
        query.set_event_value(b, 1).unwrap();
        query
    }

    #[test]
    fn estimates_posterior_given_evidence() {
        let network = two_node();
        let mut query = posterior_query(&network);
        assert_eq!(query.problem(), "P(+A|+B)");

        let mut rng = SmallRng::seed_from_u64(2024);
        let outcome = query.execute(20_000, &mut rng).unwrap();
        let exact = 0.24 / (0.24 + 0.07);
        assert!(
            (outcome.probability - exact).abs() < 0.03,
            "estimate {} vs exact {exact}",
            outcome.probability
        );
        assert!(outcome.good <= outcome.usable && outcome.usable <= outcome.samples);
        assert!(query.states().iter().all(EventState::is_calculated));
    }

    #[test]
    fn same_seed_gives_same_estimate() {
        let network = two_node();
        let mut first = posterior_query(&network);
        let mut second = posterior_query(&network);
        let a = first
            .execute(500, &mut SmallRng::seed_from_u64(5))
            .unwrap();
        let b = second
            .execute(500, &mut SmallRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn marginal_without_evidence_uses_every_sample() {
        let network = two_node();
        let b = network.require("B").unwrap();
        let mut query = SamplingQuery::new(&network);
        query.define_event_type(b, EventRole::Outcome).unwrap();
        query.set_event_value(b, 1).unwrap();
        assert_eq!(query.problem(), "P(+B)");

        let outcome = query
            .execute(20_000, &mut SmallRng::seed_from_u64(8))
            .unwrap();
        assert_eq!(outcome.usable, outcome.samples);
        assert!((outcome.probability - 0.31).abs() < 0.03);
    }

    #[test]
    fn query_requires_an_outcome_and_samples() {
        let network = two_node();
        let mut query = SamplingQuery::new(&network);
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(matches!(
            query.execute(10, &mut rng),
            Err(InferenceError::NoOutcome)
        ));

        let mut query = posterior_query(&network);
        assert!(matches!(
            query.execute(0, &mut rng),
            Err(InferenceError::ZeroSamples)
        ));
    }

    #[test]
    fn evidence_no_draw_can_match_yields_zero() {
        let network = two_node();
        let a = network.require("A").unwrap();
        let mut query = posterior_query(&network);
        query.define_event_type(a, EventRole::Evidence).unwrap();
        query.define_event_value(a, 0.5).unwrap();
        let b = network.require("B").unwrap();
        query.define_event_type(b, EventRole::Outcome).unwrap();

        let outcome = query
            .execute(100, &mut SmallRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(outcome.usable, 0);
        assert_eq!(outcome.probability, 0.0);
    }

    #[test]
    fn choice_out_of_range_is_rejected() {
        let network = two_node();
        let a = network.require("A").unwrap();
        let mut query = SamplingQuery::new(&network);
        assert!(matches!(
            query.set_event_value(a, 2),
            Err(InferenceError::UnknownChoice { .. })
        ));
    }

    #[test]
    fn reset_roles_makes_every_state_hidden() {
        let network = two_node();
        let mut query = posterior_query(&network);
        query.reset_roles();
        assert!(
            query
                .states()
                .iter()
                .all(|state| state.role() == EventRole::Hidden)
        );
        assert_eq!(query.problem(), "P()");
    }

    #[test]
    fn outcome_display_includes_problem() {
        let outcome = QueryOutcome {
            problem: "P(+A|+B)".to_string(),
            samples: 10,
            usable: 4,
            good: 1,
            probability: 0.25,
        };
        assert_eq!(
            outcome.to_string(),
            "P(+A|+B) = 0.250000 (1 good / 4 usable / 10 samples)"
        );
    }
}
