//! Conditional probability table for a single event.

use crate::DEFAULT_DOUBLE_EQUAL;
use crate::error::InferenceError;
use rand::Rng;

/// Maximum tolerance when checking whether a distribution sums to one.
const DISTRIBUTION_EPSILON: f64 = 1e-6;

/// One row of the table: `P(result | arguments) = probability`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLine {
    probability: f64,
    result: usize,
    arguments: Vec<usize>,
}

impl TableLine {
    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn result(&self) -> usize {
        self.result
    }

    pub fn arguments(&self) -> &[usize] {
        &self.arguments
    }

    /// Returns true when the parent values select this line.
    pub fn compare_args(&self, args: &[f64]) -> bool {
        self.arguments.len() == args.len()
            && self
                .arguments
                .iter()
                .zip(args)
                .all(|(&expected, &actual)| (expected as f64 - actual).abs() < DEFAULT_DOUBLE_EQUAL)
    }
}

#[derive(Debug, Clone)]
pub struct EventTable {
    label: String,
    choice_count: usize,
    parent_choice_counts: Vec<usize>,
    lines: Vec<TableLine>,
}

impl EventTable {
    pub(crate) fn new(
        label: impl Into<String>,
        choice_count: usize,
        parent_choice_counts: Vec<usize>,
    ) -> Self {
        Self {
            label: label.into(),
            choice_count,
            parent_choice_counts,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[TableLine] {
        &self.lines
    }

    pub fn parent_count(&self) -> usize {
        self.parent_choice_counts.len()
    }

    /// Adds or replaces the probability of `result` given the parents' choice indices.
    pub fn add_line(
        &mut self,
        probability: f64,
        result: usize,
        arguments: &[usize],
    ) -> Result<(), InferenceError> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(self.invalid_line(format!("probability {probability} outside [0, 1]")));
        }
        if result >= self.choice_count {
            return Err(self.invalid_line(format!(
                "result {result} out of range for {} choices",
                self.choice_count
            )));
        }
        if arguments.len() != self.parent_choice_counts.len() {
            return Err(self.invalid_line(format!(
                "expected {} arguments, got {}",
                self.parent_choice_counts.len(),
                arguments.len()
            )));
        }
        if let Some((position, arg)) = arguments
            .iter()
            .enumerate()
            .find(|(i, arg)| **arg >= self.parent_choice_counts[*i])
        {
            return Err(self.invalid_line(format!(
                "argument {position} has choice {arg} out of range"
            )));
        }

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|line| line.result == result && line.arguments == arguments)
        {
            existing.probability = probability;
        } else {
            self.lines.push(TableLine {
                probability,
                result,
                arguments: arguments.to_vec(),
            });
        }
        Ok(())
    }

    /// Looks up `P(result | arguments)`, if the table defines it.
    pub fn probability(&self, result: usize, arguments: &[usize]) -> Option<f64> {
        self.lines
            .iter()
            .find(|line| line.result == result && line.arguments == arguments)
            .map(TableLine::probability)
    }

    /// Checks that every combination of parent choices has a distribution summing to one.
    pub fn validate(&self) -> Result<(), InferenceError> {
        let mut combination = vec![0usize; self.parent_choice_counts.len()];
        loop {
            let total: f64 = self
                .lines
                .iter()
                .filter(|line| line.arguments == combination)
                .map(TableLine::probability)
                .sum();
            if (total - 1.0).abs() > DISTRIBUTION_EPSILON {
                return Err(InferenceError::InvalidDistribution {
                    label: self.label.clone(),
                    arguments: combination,
                    total,
                });
            }
            if !advance(&mut combination, &self.parent_choice_counts) {
                return Ok(());
            }
        }
    }

    /// Draws a result index for the supplied parent values.
    ///
    /// Falls back to the last matching line with mass when rounding leaves the cumulative
    /// total just below the uniform draw.
    pub fn generate_random<R: Rng + ?Sized>(
        &self,
        args: &[f64],
        rng: &mut R,
    ) -> Result<usize, InferenceError> {
        let r: f64 = rng.gen_range(0.0..1.0);
        let mut limit = 0.0;
        let mut fallback = None;

        for line in self.lines.iter().filter(|line| line.compare_args(args)) {
            if line.probability <= 0.0 {
                continue;
            }
            limit += line.probability;
            if r < limit {
                return Ok(line.result);
            }
            fallback = Some(line.result);
        }

        fallback.ok_or_else(|| InferenceError::IncompleteTable {
            label: self.label.clone(),
        })
    }

    fn invalid_line(&self, reason: String) -> InferenceError {
        InferenceError::InvalidLine {
            label: self.label.clone(),
            reason,
        }
    }
}

/// Odometer-style increment over the parent choice space.
fn advance(combination: &mut [usize], limits: &[usize]) -> bool {
    for (digit, limit) in combination.iter_mut().zip(limits).rev() {
        *digit += 1;
        if *digit < *limit {
            return true;
        }
        *digit = 0;
    }
    false
}
