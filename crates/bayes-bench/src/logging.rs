use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Installs a JSON subscriber writing to `<log_dir>/<run_id>.jsonl`.
///
/// Returns `None` when structured logging is disabled.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    fs::create_dir_all(&outputs.log_dir).with_context(|| {
        format!(
            "creating telemetry directory at {}",
            outputs.log_dir.display()
        )
    })?;

    let telemetry_path = outputs.log_dir.join(format!("{run_id}.jsonl"));
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A global subscriber may already be installed, e.g. by another test in the same binary.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn disabled_logging_creates_nothing() {
        let dir = tempdir().expect("temp dir");
        let outputs = ResolvedOutputs {
            log_dir: dir.path().join("logs"),
            summary_json: None,
        };
        let guard = init_logging(&LoggingConfig::default(), &outputs, "quiet").expect("init");
        assert!(guard.is_none());
        assert!(!outputs.log_dir.exists());
    }

    #[test]
    fn structured_logging_creates_telemetry_file() {
        let dir = tempdir().expect("temp dir");
        let outputs = ResolvedOutputs {
            log_dir: dir.path().join("logs"),
            summary_json: None,
        };
        let logging = LoggingConfig {
            enable_structured: true,
            ..LoggingConfig::default()
        };
        let guard = init_logging(&logging, &outputs, "loud")
            .expect("init")
            .expect("guard returned");
        assert_eq!(guard.telemetry_path, outputs.log_dir.join("loud.jsonl"));
        assert!(guard.telemetry_path.exists());
    }
}
