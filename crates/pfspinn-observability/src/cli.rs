//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-pfspinn-event-log` to raise a single crate to
//! debug level, or `--debug-all`.

use std::collections::HashMap;
use std::env;

use crate::KNOWN_CRATES;

/// Per-crate debug switches plus the level used for everything else
///
/// # Example
/// ```rust
/// use pfspinn_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-pfspinn-event-log".to_string()]);
/// assert!(flags.is_enabled("pfspinn-event-log"));
/// ```
#[derive(Debug, Clone)]
pub struct CrateDebugFlags {
    pub enabled_crates: HashMap<String, bool>,
    pub default_level: String,
}

impl Default for CrateDebugFlags {
    fn default() -> Self {
        Self {
            enabled_crates: HashMap::new(),
            default_level: "info".to_string(),
        }
    }
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    /// Build flags from a list of crate names (as stored in `logging.debug_crates`)
    pub fn from_crate_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = CrateDebugFlags::default();
        for name in names {
            match name.as_ref().trim() {
                "" => {}
                "all" => flags.enable_all(),
                crate_name => flags.enable(crate_name),
            }
        }
        flags
    }

    /// Set the level for crates without a debug flag
    pub fn with_default_level(mut self, level: &str) -> Self {
        self.default_level = level.to_lowercase();
        self
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string(), true);
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains_key(crate_name)
    }

    /// Get all enabled crates
    pub fn enabled_crates(&self) -> Vec<&String> {
        self.enabled_crates.keys().collect()
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Create a tracing filter from debug flags
    ///
    /// Tracing targets are module paths, so crate names are written with
    /// underscores: `pfspinn_event_log=debug,info`.
    pub fn to_filter_string(&self) -> String {
        let mut crate_names: Vec<&String> = self.enabled_crates.keys().collect();
        crate_names.sort();

        let mut filters: Vec<String> = crate_names
            .into_iter()
            .map(|crate_name| format!("{}=debug", target_name(crate_name)))
            .collect();
        filters.push(self.default_level.clone());
        filters.join(",")
    }
}

/// Tracing target for a crate name (`pfspinn-event-log` -> `pfspinn_event_log`)
pub fn target_name(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}

/// Parse debug flags from the process arguments and `PFSPINN_DEBUG`
///
/// Environment variable format: comma-separated crate names, or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());

    if let Ok(env_var) = env::var("PFSPINN_DEBUG") {
        let from_env = CrateDebugFlags::from_crate_names(env_var.split(','));
        flags.enabled_crates.extend(from_env.enabled_crates);
    }

    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  PFSPINN_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  PFSPINN_DEBUG=all                               Enable debug for all crates
"#,
        KNOWN_CRATES.join(", ")
    )
}
