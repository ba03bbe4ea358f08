//! Logging setup for the gallery.
//!
//! The terminal is owned by the UI, so log output never goes to stdout.
//! On Linux the journal is preferred; everywhere else (or when journald is
//! not reachable) logs go to a daily-rolling file.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "VITRINE_LOG";

/// Used when `VITRINE_LOG` is unset, blank or unparseable.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from the value of `VITRINE_LOG`.
///
/// A directive that does not parse falls back to [`DEFAULT_FILTER`]; the
/// rejected value is handed back so it can be reported once a subscriber
/// is installed.
pub fn env_filter_from(value: Option<&str>) -> (EnvFilter, Option<String>) {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => (EnvFilter::new(DEFAULT_FILTER), None),
        Some(directive) => match EnvFilter::try_new(directive) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new(DEFAULT_FILTER), Some(directive.to_string())),
        },
    }
}

/// Initialize the logging system.
///
/// Log level can be controlled via `VITRINE_LOG`, e.g. `VITRINE_LOG=debug`
/// or `VITRINE_LOG=vitrine::favorites=trace`. Defaults to `info`.
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    let (env_filter, rejected) = env_filter_from(std::env::var(LOG_ENV).ok().as_deref());

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(journald_layer.with_syslog_identifier("vitrine".to_string()))
                .init();

            tracing::info!("Logging initialized with journald backend");
            warn_rejected(rejected.as_deref());
            return Ok(());
        }
    }

    let log_dir = log_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vitrine")
            .join("logs")
    });

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "vitrine.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The worker flushes on drop; keep it for the life of the process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("Logging initialized with file backend at {:?}", log_dir);
    warn_rejected(rejected.as_deref());
    Ok(())
}

fn warn_rejected(directive: Option<&str>) {
    if let Some(directive) = directive {
        tracing::warn!(
            "Ignoring {}={:?}, using {:?}",
            LOG_ENV,
            directive,
            DEFAULT_FILTER
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_env_value() {
        let (filter, rejected) = env_filter_from(Some("debug"));
        assert_eq!(filter.to_string(), "debug");
        assert!(rejected.is_none());

        let (filter, _) = env_filter_from(Some("vitrine::favorites=trace"));
        assert_eq!(filter.to_string(), "vitrine::favorites=trace");
    }

    #[test]
    fn test_filter_defaults_to_info() {
        let (filter, rejected) = env_filter_from(None);
        assert_eq!(filter.to_string(), DEFAULT_FILTER);
        assert!(rejected.is_none());

        let (filter, rejected) = env_filter_from(Some("   "));
        assert_eq!(filter.to_string(), DEFAULT_FILTER);
        assert!(rejected.is_none());
    }

    #[test]
    fn test_unparseable_filter_falls_back_and_is_reported() {
        let (filter, rejected) = env_filter_from(Some("vitrine=loud"));
        assert_eq!(filter.to_string(), DEFAULT_FILTER);
        assert_eq!(rejected.as_deref(), Some("vitrine=loud"));
    }
}
