// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console logging is always available. With the `file-logging` feature the
//! subscriber also writes per-crate JSON files into a timestamped run folder
//! and prunes old runs.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;

/// Install a human-readable console subscriber filtered by `debug_flags`
///
/// # Errors
/// Fails if the filter string is invalid or a global subscriber is already set.
pub fn init_console_logging(debug_flags: &CrateDebugFlags) -> Result<()> {
    let filter = debug_flags.to_filter_string();
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

#[cfg(feature = "file-logging")]
pub use file::*;

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{anyhow, Context, Result};
    use chrono::{DateTime, NaiveDateTime, Utc};
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer, Registry};

    use crate::cli::{target_name, CrateDebugFlags};

    const RUN_PREFIX: &str = "run_";
    const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Keeps the non-blocking file writers alive; logs are flushed on drop
    pub struct LoggingGuard {
        _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        /// Get the run folder this process is writing to
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Initialize console logging plus per-crate and combined JSON log files
    ///
    /// ```text
    /// ./logs/
    ///   └── run_20250101_120000/
    ///       ├── pfspinn-event-log.log
    ///       ├── pfspinn-config.log
    ///       └── pfspinn.log (combined)
    /// ```
    ///
    /// # Arguments
    /// * `debug_flags` - Per-crate debug flags for filtering
    /// * `log_dir` - Base directory for logs (default: `./logs`)
    /// * `retention_days` - Keep logs for N days (default: 30)
    /// * `retention_runs` - Keep N most recent runs (default: 10)
    pub fn init_logging(
        debug_flags: &CrateDebugFlags,
        log_dir: Option<PathBuf>,
        retention_days: Option<u64>,
        retention_runs: Option<usize>,
    ) -> Result<LoggingGuard> {
        let base_log_dir = log_dir.unwrap_or_else(|| PathBuf::from("./logs"));

        let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT);
        let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        let cleanup_warnings = cleanup_old_logs(
            &base_log_dir,
            retention_days.unwrap_or(30),
            retention_runs.unwrap_or(10),
            Some(&run_folder),
        )?;

        let filter = debug_flags.to_filter_string();
        let make_filter = || EnvFilter::new(&filter);

        let mut layers = Vec::new();
        let mut file_guards = Vec::new();

        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(make_filter());
        layers.push(console_layer.boxed());

        for crate_name in crate::KNOWN_CRATES {
            let file_appender = rolling::daily(&run_folder, format!("{}.log", crate_name));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            file_guards.push(guard);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(EnvFilter::new(format!("{}=debug,off", target_name(crate_name))))
                .boxed();
            layers.push(file_layer);
        }

        let combined_appender = rolling::daily(&run_folder, "pfspinn.log");
        let (combined_non_blocking, combined_guard) =
            tracing_appender::non_blocking(combined_appender);
        file_guards.push(combined_guard);

        let combined_layer = tracing_subscriber::fmt::layer()
            .with_writer(combined_non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(make_filter())
            .boxed();
        layers.push(combined_layer);

        Registry::default()
            .with(layers)
            .try_init()
            .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

        for warning in cleanup_warnings {
            tracing::warn!("{}", warning);
        }

        Ok(LoggingGuard {
            _file_guards: file_guards,
            log_dir: run_folder,
        })
    }

    /// Initialize logging with default settings
    pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
        init_logging(debug_flags, None, None, None)
    }

    /// Remove run folders older than `retention_days`, then trim to the newest `retention_runs`
    ///
    /// `keep` is never removed. Returns one message per folder that could not be deleted.
    pub fn cleanup_old_logs(
        base_log_dir: &Path,
        retention_days: u64,
        retention_runs: usize,
        keep: Option<&Path>,
    ) -> Result<Vec<String>> {
        let mut warnings = Vec::new();
        if !base_log_dir.exists() {
            return Ok(warnings);
        }

        let cutoff_date = Utc::now() - chrono::Duration::days(retention_days as i64);

        let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() || Some(path.as_path()) == keep {
                continue;
            }
            if let Some(dt) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(RUN_PREFIX))
                .and_then(|ts| NaiveDateTime::parse_from_str(ts, RUN_TIMESTAMP_FORMAT).ok())
            {
                runs.push((path, dt.and_utc()));
            }
        }

        // Newest first
        runs.sort_by(|a, b| b.1.cmp(&a.1));

        let keep_slots = if keep.is_some() {
            retention_runs.saturating_sub(1)
        } else {
            retention_runs
        };

        for (index, (path, dt)) in runs.iter().enumerate() {
            if *dt < cutoff_date || index >= keep_slots {
                if let Err(e) = std::fs::remove_dir_all(path) {
                    warnings.push(format!(
                        "Failed to remove old log directory {}: {}",
                        path.display(),
                        e
                    ));
                }
            }
        }

        Ok(warnings)
    }

}
