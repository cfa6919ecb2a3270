//! Serde description of a network, used by config files and fixtures.

use super::BOOLEAN_CHOICES;
use crate::error::InferenceError;
use serde::{Deserialize, Serialize};

/// Events listed parents-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub events: Vec<EventSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    pub label: String,
    #[serde(default = "default_choices")]
    pub choices: Vec<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub table: Vec<LineSpec>,
}

/// `P(result | given) = probability`, with `given` naming one choice per parent in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    pub probability: f64,
    pub result: String,
    #[serde(default)]
    pub given: Vec<String>,
}

fn default_choices() -> Vec<String> {
    BOOLEAN_CHOICES.iter().map(|choice| choice.to_string()).collect()
}

impl NetworkSpec {
    pub fn from_json_str(json: &str) -> Result<Self, InferenceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, InferenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{BayesianNetwork, NetworkEvent};

    const ALARM: &str = r#"{
        "events": [
            { "label": "burglary",
              "table": [ { "probability": 0.99, "result": "false" },
                         { "probability": 0.01, "result": "true" } ] },
            { "label": "alarm", "parents": ["burglary"],
              "table": [ { "probability": 0.95, "result": "false", "given": ["false"] },
                         { "probability": 0.05, "result": "true", "given": ["false"] },
                         { "probability": 0.10, "result": "false", "given": ["true"] },
                         { "probability": 0.90, "result": "true", "given": ["true"] } ] }
        ]
    }"#;

    #[test]
    fn choices_default_to_boolean() {
        let spec = NetworkSpec::from_json_str(ALARM).unwrap();
        assert_eq!(spec.events[0].choices, vec!["false", "true"]);
        assert!(spec.events[0].parents.is_empty());
    }

    #[test]
    fn builds_a_validated_network() {
        let spec = NetworkSpec::from_json_str(ALARM).unwrap();
        let network = BayesianNetwork::from_spec(&spec).unwrap();
        let alarm = network.find("alarm").unwrap();
        assert!(alarm.is_boolean());
        assert_eq!(alarm.table().probability(1, &[1]), Some(0.90));
    }

    #[test]
    fn json_survives_a_second_pass() {
        let spec = NetworkSpec::from_json_str(ALARM).unwrap();
        let again = NetworkSpec::from_json_str(&spec.to_json_string().unwrap()).unwrap();
        assert_eq!(spec, again);
    }

    #[test]
    fn unknown_given_choice_is_rejected() {
        let mut spec = NetworkSpec::from_json_str(ALARM).unwrap();
        spec.events[1].table[0].given = vec!["perhaps".to_string()];
        assert!(matches!(
            BayesianNetwork::from_spec(&spec),
            Err(InferenceError::UnknownChoice { .. })
        ));
    }

    #[test]
    fn malformed_json_maps_to_serialization_error() {
        assert!(matches!(
            NetworkSpec::from_json_str("{ \"events\": 3 }"),
            Err(InferenceError::Serialization(_))
        ));
    }
}
