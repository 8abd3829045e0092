use std::{fs, path::Path};

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::DiagnosticsConfig;

pub const DEFAULT_FILTER: &str = "info,comboweaver_core=trace";

/// Keeps the non-blocking file writer alive; dropping it flushes the trace file.
pub struct TelemetryGuard {
    pub session_id: Uuid,
    pub trace_file: std::path::PathBuf,
    _file_guard: WorkerGuard,
}

#[must_use]
pub fn trace_file_name(prefix: &str, started_at: DateTime<Utc>) -> String {
    let prefix = prefix.trim();
    let prefix = if prefix.is_empty() { "comboweaver" } else { prefix };
    format!("{prefix}-{}.log", started_at.format("%Y%m%d-%H%M%S"))
}

/// Installs the global subscriber: `RUST_LOG` wins over the configured filter,
/// and a blank configured filter falls back to [`DEFAULT_FILTER`].
pub fn init_tracing(
    log_dir: impl AsRef<Path>,
    settings: &DiagnosticsConfig,
) -> anyhow::Result<TelemetryGuard> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory: {}", log_dir.display()))?;

    let session_id = Uuid::new_v4();
    let file_name = trace_file_name(&settings.trace_file_prefix, Utc::now());
    let trace_file = log_dir.join(&file_name);
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let configured = if settings.rust_log_filter.trim().is_empty() {
        DEFAULT_FILTER
    } else {
        settings.rust_log_filter.as_str()
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured));

    // stdout stays free for command output
    let console_layer = settings.console.then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(file_writer);

    if let Err(error) = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        warn!(?error, "global tracing subscriber already initialized");
    } else {
        info!(%session_id, trace_file = %trace_file.display(), "tracing initialized");
    }

    Ok(TelemetryGuard {
        session_id,
        trace_file,
        _file_guard: file_guard,
    })
}
