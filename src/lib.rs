// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # pfspinn - Neuromorphic event log decoding
//!
//! Turns recorded event-camera logs into per-address spike trains that a
//! spiking network simulator can replay.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! pfspinn = "0.1"
//! ```
//!
//! ```rust,no_run
//! use pfspinn::prelude::*;
//!
//! let config = load_config(None, None)?;
//! validate_config(&config)?;
//!
//! let decoded = load_vbottle("recording.log", &config.decoder)?;
//! for (address, train) in decoded.spike_trains.iter_active() {
//!     println!("{address}: {} spikes", train.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`observability`** (default): console logging and per-crate debug flags
//! - **`file-logging`**: rotating log files with retention cleanup
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: pfspinn-config                             │
//! │  (DecoderConfig, FixedWidthConfig, TOML + overrides)    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Decoding: pfspinn-event-log                            │
//! │  (wrap correction, rescaling, spike train stores)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export foundation
pub use pfspinn_config as config;

// Re-export decoding
pub use pfspinn_event_log as event_log;

// Re-export infrastructure
#[cfg(feature = "observability")]
pub use pfspinn_observability as observability;

/// Debug flags described by the `[logging]` section of a configuration
///
/// Crates listed in `debug_crates` log at `debug`; everything else uses
/// `level`. Combine with [`observability::parse_debug_flags`] to let command
/// line flags add to the file configuration.
#[cfg(feature = "observability")]
pub fn debug_flags_from_config(
    logging: &config::LoggingConfig,
) -> observability::CrateDebugFlags {
    observability::CrateDebugFlags::from_crate_names(&logging.debug_crates)
        .with_default_level(&logging.level)
}

/// Install logging as described by the `[logging]` section
///
/// Always logs to the console. With `file_logging = true` it also writes
/// per-crate JSON files into a run folder under `log_dir`, pruning runs older
/// than `retention_days` or beyond the newest `retention_runs`. Keep the
/// returned guard alive until exit so buffered file output is flushed.
///
/// # Errors
/// Fails if the level is not a valid filter, the log directory cannot be
/// created, or a global subscriber is already installed.
#[cfg(feature = "file-logging")]
pub fn init_logging_from_config(
    logging: &config::LoggingConfig,
) -> anyhow::Result<Option<observability::LoggingGuard>> {
    let debug_flags = debug_flags_from_config(logging);
    if !logging.file_logging {
        observability::init_console_logging(&debug_flags)?;
        return Ok(None);
    }

    let guard = observability::init_logging(
        &debug_flags,
        Some(logging.log_dir.clone()),
        Some(logging.retention_days),
        Some(logging.retention_runs),
    )?;
    Ok(Some(guard))
}

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{
        load_config, validate_config, DecoderConfig, FixedWidthConfig, LoggingConfig,
        PfSpinnConfig,
    };
    pub use crate::event_log::{
        load_spike_train, load_vbottle, load_vbottle_sparse, DecodeDiagnostics, DecodedLog,
        DenseSpikeTrains, EventLogError, FixedWidthLoad, FixedWidthLoader, FnSink,
        SparseSpikeTrains, SpikeSink, SpikeTrainStore, VBottleDecoder,
    };

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_console_logging, CrateDebugFlags};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let config = PfSpinnConfig::default();
        assert!(VBottleDecoder::new(config.decoder).is_ok());
        assert!(FixedWidthLoader::new(config.fixed_width).is_ok());
    }

    #[cfg(feature = "observability")]
    #[test]
    fn test_debug_flags_from_config() {
        let logging = config::LoggingConfig {
            level: "WARN".to_string(),
            debug_crates: vec!["pfspinn-event-log".to_string()],
            ..config::LoggingConfig::default()
        };
        let flags = debug_flags_from_config(&logging);

        assert!(flags.is_enabled("pfspinn-event-log"));
        assert_eq!(flags.to_filter_string(), "pfspinn_event_log=debug,warn");
    }
}
