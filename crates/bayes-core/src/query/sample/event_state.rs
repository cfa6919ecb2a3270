//! Per-sample state of one event during a query.

use crate::DEFAULT_DOUBLE_EQUAL;
use crate::error::InferenceError;
use crate::network::NetworkEvent;
use crate::query::EventRole;
use core::fmt;
use rand::Rng;

/// Holds the drawn value of an event within one sample, along with the value the query
/// compares it against.
///
/// The event is borrowed, never owned: one network event backs many states.
#[derive(Debug)]
pub struct EventState<'a, E> {
    event: &'a E,
    role: EventRole,
    value: Option<f64>,
    compare_value: f64,
}

impl<E> Clone for EventState<'_, E> {
    fn clone(&self) -> Self {
        Self {
            event: self.event,
            role: self.role,
            value: self.value,
            compare_value: self.compare_value,
        }
    }
}

impl<'a, E: NetworkEvent> EventState<'a, E> {
    pub fn new(event: &'a E) -> Self {
        Self {
            event,
            role: EventRole::Hidden,
            value: None,
            compare_value: 0.0,
        }
    }

    pub fn event(&self) -> &'a E {
        self.event
    }

    pub fn role(&self) -> EventRole {
        self.role
    }

    pub fn set_role(&mut self, role: EventRole) {
        self.role = role;
    }

    /// Has a value been drawn or assigned since construction or the last reset?
    pub fn is_calculated(&self) -> bool {
        self.value.is_some()
    }

    /// The drawn value, or `0.0` while unresolved. Use [`Self::resolved_value`] to tell
    /// the two apart.
    pub fn value(&self) -> f64 {
        self.value.unwrap_or_default()
    }

    pub fn resolved_value(&self) -> Option<f64> {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }

    pub fn compare_value(&self) -> f64 {
        self.compare_value
    }

    pub fn set_compare_value(&mut self, compare_value: f64) {
        self.compare_value = compare_value;
    }

    /// Returns the state to unresolved for the next sample. Role and compare value are kept.
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Draws a value from the event's table given the parents' values and stores it.
    ///
    /// On error the state is left untouched.
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        parents: &[f64],
        rng: &mut R,
    ) -> Result<f64, InferenceError> {
        let value = self.event.generate_random(parents, rng)?;
        self.set_value(value);
        Ok(value)
    }

    /// True when the drawn value equals the compare value within [`DEFAULT_DOUBLE_EQUAL`].
    pub fn is_satisfied(&self) -> Result<bool, InferenceError> {
        if self.role == EventRole::Hidden {
            return Err(InferenceError::HiddenSatisfaction {
                label: self.event.label().to_string(),
            });
        }
        Ok((self.compare_value - self.value()).abs() < DEFAULT_DOUBLE_EQUAL)
    }
}

impl<E: NetworkEvent> fmt::Display for EventState<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[EventState:event={},type={},value={:.2},compare={:.2},calc={}]",
            self.event,
            self.role,
            self.value(),
            self.compare_value,
            if self.is_calculated() { "y" } else { "n" }
        )
    }
}
