use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use bayes_core::InferenceError;
use bayes_core::network::BayesianNetwork;
use bayes_core::query::{EventRole, QueryOutcome, SamplingQuery};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{QueryConfig, ResolvedOutputs};

/// Runs one configured sampling query.
pub struct QueryRunner {
    config: QueryConfig,
    outputs: ResolvedOutputs,
    network: BayesianNetwork,
}

/// Summary details returned after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: QueryOutcome,
    pub seed: u64,
    pub elapsed_ms: f64,
    pub summary_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
    run_id: &'a str,
    seed: u64,
    #[serde(flatten)]
    outcome: &'a QueryOutcome,
}

impl QueryRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: QueryConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let network = BayesianNetwork::from_spec(&config.network)?;
        Ok(Self {
            config,
            outputs,
            network,
        })
    }

    pub fn network(&self) -> &BayesianNetwork {
        &self.network
    }

    /// Execute the query and write the JSON summary when one is configured.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        let seed = self.config.sampling.seed.unwrap_or(0);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut query = self.build_query()?;

        let started = Instant::now();
        let outcome = query.execute(self.config.sampling.samples, &mut rng)?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

        event!(
            target: "bayes_bench::query",
            Level::INFO,
            run_id = %self.config.run_id,
            seed,
            problem = %outcome.problem,
            samples = outcome.samples,
            usable = outcome.usable,
            good = outcome.good,
            probability = outcome.probability,
            elapsed_ms,
        );

        if self.config.logging.state_details {
            for state in query.states() {
                event!(
                    target: "bayes_bench::state",
                    Level::DEBUG,
                    run_id = %self.config.run_id,
                    state = %state,
                );
            }
        }

        let summary_path = match self.outputs.summary_json.as_ref() {
            Some(path) => {
                self.write_summary(path, seed, &outcome)?;
                Some(path.clone())
            }
            None => None,
        };

        Ok(RunSummary {
            outcome,
            seed,
            elapsed_ms,
            summary_path,
        })
    }

    fn build_query(&self) -> Result<SamplingQuery<'_>, RunnerError> {
        let mut query = SamplingQuery::new(&self.network);
        for (role, entries) in [
            (EventRole::Outcome, &self.config.query.outcome),
            (EventRole::Evidence, &self.config.query.evidence),
        ] {
            for (label, choice) in entries {
                let id = self.network.require(label)?;
                let choice = self
                    .network
                    .event(id)
                    .ok_or_else(|| InferenceError::UnknownEvent {
                        label: label.clone(),
                    })?
                    .choice_index(choice)?;
                query.define_event_type(id, role)?;
                query.set_event_value(id, choice)?;
            }
        }
        Ok(query)
    }

    fn write_summary(
        &self,
        path: &Path,
        seed: u64,
        outcome: &QueryOutcome,
    ) -> Result<(), RunnerError> {
        ensure_parent(path.parent())?;
        let mut writer = BufWriter::new(File::create(path)?);
        let record = SummaryRecord {
            run_id: &self.config.run_id,
            seed,
            outcome,
        };
        serde_json::to_writer_pretty(&mut writer, &record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize summary: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
