use super::{BOOLEAN_CHOICES, BayesianEvent, EventId, NetworkEvent, NetworkSpec};
use crate::error::InferenceError;
use std::collections::HashMap;

/// Owns the events of a Bayesian network.
///
/// Parents must be created before their children, so `events()` is always in topological
/// order and a sampler can resolve events front to back.
#[derive(Debug, Clone, Default)]
pub struct BayesianNetwork {
    events: Vec<BayesianEvent>,
    index: HashMap<String, EventId>,
}

impl BayesianNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[BayesianEvent] {
        &self.events
    }

    pub fn event(&self, id: EventId) -> Option<&BayesianEvent> {
        self.events.get(id.index())
    }

    pub fn event_mut(&mut self, id: EventId) -> Option<&mut BayesianEvent> {
        self.events.get_mut(id.index())
    }

    pub fn find(&self, label: &str) -> Option<&BayesianEvent> {
        self.index.get(label).and_then(|id| self.event(*id))
    }

    pub fn require(&self, label: &str) -> Result<EventId, InferenceError> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| InferenceError::UnknownEvent {
                label: label.to_string(),
            })
    }

    pub fn create_event(
        &mut self,
        label: &str,
        choices: &[&str],
    ) -> Result<EventId, InferenceError> {
        if label.trim().is_empty() {
            return Err(InferenceError::InvalidEvent {
                label: label.to_string(),
                reason: "label must not be empty".to_string(),
            });
        }
        if self.index.contains_key(label) {
            return Err(InferenceError::DuplicateEvent {
                label: label.to_string(),
            });
        }
        if choices.len() < 2 {
            return Err(InferenceError::InvalidEvent {
                label: label.to_string(),
                reason: format!("needs at least two choices, got {}", choices.len()),
            });
        }
        if let Some(duplicate) = choices
            .iter()
            .enumerate()
            .find(|(i, choice)| choices[..*i].contains(*choice))
            .map(|(_, choice)| *choice)
        {
            return Err(InferenceError::InvalidEvent {
                label: label.to_string(),
                reason: format!("choice '{duplicate}' is listed twice"),
            });
        }

        let id = EventId::new(self.events.len());
        self.events.push(BayesianEvent::new(
            id,
            label.to_string(),
            choices.iter().map(|choice| choice.to_string()).collect(),
        ));
        self.index.insert(label.to_string(), id);
        Ok(id)
    }

    pub fn create_boolean_event(&mut self, label: &str) -> Result<EventId, InferenceError> {
        self.create_event(label, &BOOLEAN_CHOICES)
    }

    /// Makes `parent` a parent of `child`. Clears any lines already added to `child`.
    pub fn create_dependency(
        &mut self,
        parent: EventId,
        child: EventId,
    ) -> Result<(), InferenceError> {
        let (parent_label, child_label) = match (self.event(parent), self.event(child)) {
            (Some(p), Some(c)) => (p.label().to_string(), c.label().to_string()),
            (None, _) => {
                return Err(InferenceError::UnknownEvent {
                    label: parent.to_string(),
                });
            }
            (_, None) => {
                return Err(InferenceError::UnknownEvent {
                    label: child.to_string(),
                });
            }
        };
        let reject = |reason: &str| InferenceError::InvalidDependency {
            parent: parent_label.clone(),
            child: child_label.clone(),
            reason: reason.to_string(),
        };

        if parent == child {
            return Err(reject("an event cannot depend on itself"));
        }
        if parent > child {
            return Err(reject("parent must be created before its child"));
        }
        if self.events[child.index()].parents().contains(&parent) {
            return Err(reject("dependency already exists"));
        }

        let mut parent_choice_counts: Vec<usize> = self.events[child.index()]
            .parents()
            .iter()
            .map(|id| self.events[id.index()].choices().len())
            .collect();
        parent_choice_counts.push(self.events[parent.index()].choices().len());

        self.events[child.index()].attach_parent(parent, parent_choice_counts);
        self.events[parent.index()].attach_child(child);
        Ok(())
    }

    /// Validates every event's table.
    pub fn validate(&self) -> Result<(), InferenceError> {
        self.events
            .iter()
            .try_for_each(|event| event.table().validate())
    }

    /// Builds and validates a network from its serde description.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Self, InferenceError> {
        let mut network = Self::new();

        for event in &spec.events {
            let choices: Vec<&str> = event.choices.iter().map(String::as_str).collect();
            network.create_event(&event.label, &choices)?;
        }

        for event in &spec.events {
            let child = network.require(&event.label)?;
            for parent in &event.parents {
                let parent = network.require(parent)?;
                network.create_dependency(parent, child)?;
            }
        }

        for event in &spec.events {
            let id = network.require(&event.label)?;
            let parent_ids = network.events[id.index()].parents().to_vec();
            for line in &event.table {
                if line.given.len() != parent_ids.len() {
                    return Err(InferenceError::InvalidLine {
                        label: event.label.clone(),
                        reason: format!(
                            "expected {} given choices, got {}",
                            parent_ids.len(),
                            line.given.len()
                        ),
                    });
                }
                let arguments = parent_ids
                    .iter()
                    .zip(&line.given)
                    .map(|(parent, choice)| network.events[parent.index()].choice_index(choice))
                    .collect::<Result<Vec<_>, _>>()?;
                let target = &mut network.events[id.index()];
                let result = target.choice_index(&line.result)?;
                target.add_line(line.probability, result, &arguments)?;
            }
        }

        network.validate()?;
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprinkler() -> BayesianNetwork {
        let mut network = BayesianNetwork::new();
        let rain = network.create_boolean_event("rain").unwrap();
        let sprinkler = network.create_boolean_event("sprinkler").unwrap();
        let wet = network.create_boolean_event("wet").unwrap();
        network.create_dependency(rain, wet).unwrap();
        network.create_dependency(sprinkler, wet).unwrap();
        network
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let mut network = BayesianNetwork::new();
        network.create_boolean_event("A").unwrap();
        assert!(matches!(
            network.create_boolean_event("A"),
            Err(InferenceError::DuplicateEvent { .. })
        ));
    }

    #[test]
    fn events_need_distinct_choices() {
        let mut network = BayesianNetwork::new();
        assert!(network.create_event("single", &["only"]).is_err());
        assert!(network.create_event("twice", &["a", "b", "a"]).is_err());
        assert!(network.create_event("", &["a", "b"]).is_err());
        assert!(network.is_empty());
    }

    #[test]
    fn dependencies_keep_topological_order() {
        let mut network = sprinkler();
        let rain = network.require("rain").unwrap();
        let wet = network.require("wet").unwrap();
        assert!(network.create_dependency(wet, rain).is_err());
        assert!(network.create_dependency(wet, wet).is_err());
        assert!(network.create_dependency(rain, wet).is_err());

        let wet_event = network.event(wet).unwrap();
        assert_eq!(wet_event.parents().len(), 2);
        assert_eq!(wet_event.table().parent_count(), 2);
        assert_eq!(network.event(rain).unwrap().children(), &[wet]);
    }

    #[test]
    fn validate_reports_missing_tables() {
        let network = sprinkler();
        assert!(matches!(
            network.validate(),
            Err(InferenceError::InvalidDistribution { .. })
        ));
    }

    #[test]
    fn lookup_by_label() {
        let network = sprinkler();
        assert_eq!(network.find("wet").map(|e| e.label()), Some("wet"));
        assert!(network.find("snow").is_none());
        assert!(matches!(
            network.require("snow"),
            Err(InferenceError::UnknownEvent { .. })
        ));
    }
}
