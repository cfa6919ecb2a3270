use super::{EventTable, NetworkEvent};
use crate::error::InferenceError;
use core::fmt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Choice labels for two-valued events; index 0 is the "false" category.
pub const BOOLEAN_CHOICES: [&str; 2] = ["false", "true"];

/// Index of an event inside its [`BayesianNetwork`](super::BayesianNetwork).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(usize);

impl EventId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A network variable with discrete choices. A drawn value is the chosen index as `f64`.
#[derive(Debug, Clone)]
pub struct BayesianEvent {
    id: EventId,
    label: String,
    choices: Vec<String>,
    parents: Vec<EventId>,
    children: Vec<EventId>,
    table: EventTable,
}

impl BayesianEvent {
    pub(crate) fn new(id: EventId, label: String, choices: Vec<String>) -> Self {
        let table = EventTable::new(label.clone(), choices.len(), Vec::new());
        Self {
            id,
            label,
            choices,
            parents: Vec::new(),
            children: Vec::new(),
            table,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn parents(&self) -> &[EventId] {
        &self.parents
    }

    pub fn children(&self) -> &[EventId] {
        &self.children
    }

    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }

    pub fn table(&self) -> &EventTable {
        &self.table
    }

    pub fn choice_index(&self, choice: &str) -> Result<usize, InferenceError> {
        self.choices
            .iter()
            .position(|candidate| candidate == choice)
            .ok_or_else(|| InferenceError::UnknownChoice {
                event: self.label.clone(),
                choice: choice.to_string(),
            })
    }

    /// Sets `P(self = result | parents = arguments)`.
    pub fn add_line(
        &mut self,
        probability: f64,
        result: usize,
        arguments: &[usize],
    ) -> Result<(), InferenceError> {
        self.table.add_line(probability, result, arguments)
    }

    /// Links `parent` and rebuilds the (now differently shaped) table.
    pub(crate) fn attach_parent(&mut self, parent: EventId, parent_choice_counts: Vec<usize>) {
        self.parents.push(parent);
        self.table = EventTable::new(self.label.clone(), self.choices.len(), parent_choice_counts);
    }

    pub(crate) fn attach_child(&mut self, child: EventId) {
        self.children.push(child);
    }
}

impl NetworkEvent for BayesianEvent {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_boolean(&self) -> bool {
        self.choices.len() == 2
    }

    fn generate_random<R: Rng + ?Sized>(
        &self,
        parents: &[f64],
        rng: &mut R,
    ) -> Result<f64, InferenceError> {
        self.table
            .generate_random(parents, rng)
            .map(|result| result as f64)
    }
}

impl fmt::Display for BayesianEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
