use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

/// Keeps the non-blocking writer alive; dropping it flushes pending events.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Filter used when `RUST_LOG` is unset. The determinizer gets its own level
/// so constraint-search traces can be captured without every trick event, and
/// per-card play events stay off unless asked for.
pub fn filter_directives(logging: &LoggingConfig) -> String {
    let level = logging.level().unwrap_or(Level::INFO);
    let determinizer = logging.determinizer_level().unwrap_or(level);
    let plays = if logging.log_plays { level.as_str() } else { "off" };
    format!(
        "{},euchre_core::determinize={},euchre_bench::play={}",
        level.as_str(),
        determinizer.as_str(),
        plays
    )
    .to_ascii_lowercase()
}

/// Installs the JSON subscriber when structured logging is enabled. Events go
/// to `<run_id>.telemetry.jsonl` beside the summary table.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let telemetry_dir = outputs
        .summary_md
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&telemetry_dir).with_context(|| {
        format!(
            "creating telemetry directory at {}",
            telemetry_dir.display()
        )
    })?;

    let telemetry_path = telemetry_dir.join(format!("{run_id}.telemetry.jsonl"));
    let file = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(logging)));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A global subscriber may already be installed by an earlier run in the same process.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _guard: guard,
        telemetry_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_scope_the_engine_targets() {
        assert_eq!(
            filter_directives(&LoggingConfig::default()),
            "info,euchre_core::determinize=info,euchre_bench::play=off"
        );

        let logging = LoggingConfig {
            tracing_level: "warn".to_string(),
            determinizer_level: Some("trace".to_string()),
            log_plays: true,
            ..LoggingConfig::default()
        };
        assert_eq!(
            filter_directives(&logging),
            "warn,euchre_core::determinize=trace,euchre_bench::play=warn"
        );
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        let outputs = ResolvedOutputs {
            jsonl: PathBuf::from("never/created/hands.jsonl"),
            summary_md: PathBuf::from("never/created/summary.md"),
        };
        let guard = init_logging(&LoggingConfig::default(), &outputs, "quiet").expect("no-op");
        assert!(guard.is_none());
        assert!(!Path::new("never/created").exists());
    }

    #[test]
    fn enabled_logging_creates_telemetry_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let outputs = ResolvedOutputs {
            jsonl: dir.path().join("hands.jsonl"),
            summary_md: dir.path().join("summary.md"),
        };
        let logging = LoggingConfig {
            enable_structured: true,
            tracing_level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        let guard = init_logging(&logging, &outputs, "loud")
            .expect("logging starts")
            .expect("guard returned");
        assert_eq!(guard.telemetry_path, dir.path().join("loud.telemetry.jsonl"));
        assert!(guard.telemetry_path.exists());
    }
}
