// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, PfSpinnConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "pfspinn_configuration.toml";

/// Find the pfspinn configuration file
///
/// Search order:
/// 1. `PFSPINN_CONFIG_PATH` environment variable
/// 2. Current working directory: `./pfspinn_configuration.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("PFSPINN_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by PFSPINN_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "pfspinn configuration file '{}' not found in any of these locations:\n{}\n\nSet PFSPINN_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is left to [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<PfSpinnConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: PfSpinnConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Parse an unsigned integer written either in decimal or as `0x`-prefixed hex
pub fn parse_u32_value(value: &str) -> Option<u32> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => value.replace('_', "").parse::<u32>().ok(),
    }
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `PFSPINN_UNIT_SCALE` -> `decoder.unit_scale`
/// - `PFSPINN_ADDRESS_BITS` -> `decoder.address_bits`
/// - `PFSPINN_MAX_TIMESTAMP` -> `decoder.max_timestamp` (decimal or hex)
/// - `PFSPINN_WINDOW_SIZE` -> `decoder.window_size`
/// - `PFSPINN_TABLE_BITS` -> `fixed_width.table_bits`
/// - `PFSPINN_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut PfSpinnConfig) {
    if let Ok(value) = env::var("PFSPINN_UNIT_SCALE") {
        if let Ok(scale) = value.parse::<f64>() {
            config.decoder.unit_scale = scale;
        }
    }
    if let Ok(value) = env::var("PFSPINN_ADDRESS_BITS") {
        if let Some(bits) = parse_u32_value(&value) {
            config.decoder.address_bits = bits;
        }
    }
    if let Ok(value) = env::var("PFSPINN_MAX_TIMESTAMP") {
        if let Some(max) = parse_u32_value(&value) {
            config.decoder.max_timestamp = max;
        }
    }
    if let Ok(value) = env::var("PFSPINN_WINDOW_SIZE") {
        if let Some(window) = parse_u32_value(&value) {
            config.decoder.window_size = window;
        }
    }
    if let Ok(value) = env::var("PFSPINN_TABLE_BITS") {
        if let Some(bits) = parse_u32_value(&value) {
            config.fixed_width.table_bits = bits;
        }
    }
    if let Ok(value) = env::var("PFSPINN_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"address_bits": "17", "max_timestamp": "0xFFFF"}`)
pub fn apply_cli_overrides(config: &mut PfSpinnConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("unit_scale") {
        if let Ok(scale) = value.parse::<f64>() {
            config.decoder.unit_scale = scale;
        }
    }
    if let Some(value) = cli_args.get("address_bits") {
        if let Some(bits) = parse_u32_value(value) {
            config.decoder.address_bits = bits;
        }
    }
    if let Some(value) = cli_args.get("max_timestamp") {
        if let Some(max) = parse_u32_value(value) {
            config.decoder.max_timestamp = max;
        }
    }
    if let Some(value) = cli_args.get("window_size") {
        if let Some(window) = parse_u32_value(value) {
            config.decoder.window_size = window;
        }
    }
    if let Some(value) = cli_args.get("table_bits") {
        if let Some(bits) = parse_u32_value(value) {
            config.fixed_width.table_bits = bits;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
