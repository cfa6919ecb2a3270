//! Canonical probability-expression tokens.
//!
//! Equivalent queries render to the same string, so these double as dedup keys.

use crate::network::NetworkEvent;
use crate::query::{EventRole, EventState};

/// Compare values below this are the "false" category of a boolean event.
const BOOLEAN_FALSE_BELOW: f64 = 0.1;

/// Renders the value a state is queried for: `+A` / `-A` for boolean events, `B=2.0`
/// otherwise.
///
/// Reads only the compare value and the event's label and boolean-ness. Hidden states
/// still render, although the token carries no meaning for the query.
pub fn to_simple_string<E: NetworkEvent>(state: &EventState<'_, E>) -> String {
    let event = state.event();
    if event.is_boolean() {
        let sign = if state.compare_value() < BOOLEAN_FALSE_BELOW {
            '-'
        } else {
            '+'
        };
        format!("{sign}{}", event.label())
    } else {
        // `{:?}` keeps the trailing `.0` on integral values and round-trips through `parse`.
        format!("{}={:?}", event.label(), state.compare_value())
    }
}

/// Renders a whole query as `P(outcomes|evidence)`, skipping hidden states.
pub fn problem_string<E: NetworkEvent>(states: &[EventState<'_, E>]) -> String {
    let join = |role: EventRole| {
        states
            .iter()
            .filter(|state| state.role() == role)
            .map(to_simple_string)
            .collect::<Vec<_>>()
            .join(",")
    };

    let outcome = join(EventRole::Outcome);
    let evidence = join(EventRole::Evidence);
    if evidence.is_empty() {
        format!("P({outcome})")
    } else {
        format!("P({outcome}|{evidence})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{BayesianEvent, BayesianNetwork};

    fn network() -> BayesianNetwork {
        let mut network = BayesianNetwork::new();
        network.create_boolean_event("A").unwrap();
        network.create_event("B", &["zero", "one", "two"]).unwrap();
        network.create_boolean_event("C").unwrap();
        network
    }

    fn state<'a>(
        network: &'a BayesianNetwork,
        label: &str,
        compare: f64,
    ) -> EventState<'a, BayesianEvent> {
        let mut state = EventState::new(network.find(label).unwrap());
        state.set_compare_value(compare);
        state
    }

    #[test]
    fn boolean_tokens_use_sign() {
        let network = network();
        assert_eq!(to_simple_string(&state(&network, "A", 0.0)), "-A");
        assert_eq!(to_simple_string(&state(&network, "A", 1.0)), "+A");
        assert_eq!(to_simple_string(&state(&network, "A", 0.1)), "+A");
        assert_eq!(to_simple_string(&state(&network, "A", 0.099)), "-A");
    }

    #[test]
    fn multi_valued_tokens_show_the_value() {
        let network = network();
        let token = to_simple_string(&state(&network, "B", 2.0));
        assert_eq!(token, "B=2.0");
        let parsed: f64 = token.trim_start_matches("B=").parse().unwrap();
        assert_eq!(parsed, 2.0);
        assert_eq!(to_simple_string(&state(&network, "B", 0.25)), "B=0.25");
    }

    #[test]
    fn token_ignores_drawn_value_and_role() {
        let network = network();
        let mut hidden = state(&network, "A", 1.0);
        hidden.set_value(0.0);
        assert_eq!(to_simple_string(&hidden), "+A");
        hidden.set_role(EventRole::Outcome);
        assert_eq!(to_simple_string(&hidden), "+A");
    }

    #[test]
    fn problem_lists_outcomes_then_evidence() {
        let network = network();
        let mut states = vec![
            state(&network, "A", 1.0),
            state(&network, "B", 2.0),
            state(&network, "C", 0.0),
        ];
        states[0].set_role(EventRole::Outcome);
        assert_eq!(problem_string(&states), "P(+A)");

        states[1].set_role(EventRole::Outcome);
        states[2].set_role(EventRole::Evidence);
        assert_eq!(problem_string(&states), "P(+A,B=2.0|-C)");
    }
}
