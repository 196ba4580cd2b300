//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent and within valid ranges.

use crate::{ConfigError, ConfigResult, PfSpinnConfig, MAX_TABLE_BITS};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    OutOfRange { field: String, value: String, range: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, value, range } => {
                write!(f, "{} = {} is outside valid range ({})", field, value, range)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Decoder scale, address space and wrap modulus
/// - Fixed-width table sizing
/// - Known log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &PfSpinnConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_decoder(config, &mut errors);
    validate_fixed_width(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_decoder(config: &PfSpinnConfig, errors: &mut Vec<ConfigValidationError>) {
    let decoder = &config.decoder;

    if !decoder.unit_scale.is_finite() || decoder.unit_scale <= 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "decoder.unit_scale".to_string(),
            reason: "must be finite and positive".to_string(),
        });
    }

    if decoder.address_bits == 0 || decoder.address_bits > 32 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "decoder.address_bits".to_string(),
            value: decoder.address_bits.to_string(),
            range: "1-32".to_string(),
        });
    }

    if decoder.max_timestamp == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "decoder.max_timestamp".to_string(),
            reason: "wrap modulus must be non-zero".to_string(),
        });
    }
}

fn validate_fixed_width(config: &PfSpinnConfig, errors: &mut Vec<ConfigValidationError>) {
    let fixed = &config.fixed_width;

    if fixed.table_bits == 0 || fixed.table_bits > MAX_TABLE_BITS {
        errors.push(ConfigValidationError::OutOfRange {
            field: "fixed_width.table_bits".to_string(),
            value: fixed.table_bits.to_string(),
            range: format!("1-{}", MAX_TABLE_BITS),
        });
    }

    if fixed.hi_shift >= 32 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "fixed_width.hi_shift".to_string(),
            value: fixed.hi_shift.to_string(),
            range: "0-31".to_string(),
        });
    }
}

fn validate_logging(config: &PfSpinnConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PfSpinnConfig::default();
        let result = validate_config(&config);
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_address_bits() {
        let mut config = PfSpinnConfig::default();
        config.decoder.address_bits = 33;

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("decoder.address_bits"));
            assert!(msg.contains("1-32"));
        }
    }

    #[test]
    fn test_non_positive_unit_scale() {
        let mut config = PfSpinnConfig::default();
        config.decoder.unit_scale = 0.0;

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("decoder.unit_scale"));
        }
    }

    #[test]
    fn test_nan_unit_scale() {
        let mut config = PfSpinnConfig::default();
        config.decoder.unit_scale = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_wrap_modulus() {
        let mut config = PfSpinnConfig::default();
        config.decoder.max_timestamp = 0;

        let result = validate_config(&config);
        assert!(result.is_err());

        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("max_timestamp"));
        }
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut config = PfSpinnConfig::default();
        config.fixed_width.table_bits = 0;
        config.fixed_width.hi_shift = 40;
        config.logging.level = "WARNING".to_string();

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("fixed_width.table_bits"));
            assert!(msg.contains("fixed_width.hi_shift"));
            assert!(msg.contains("logging.level"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_table_bits_limited_to_allocatable_table() {
        let mut config = PfSpinnConfig::default();
        config.fixed_width.table_bits = MAX_TABLE_BITS;
        assert!(validate_config(&config).is_ok());

        config.fixed_width.table_bits = 28;
        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("fixed_width.table_bits"));
                assert!(msg.contains("1-24"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_wide_address_space_is_valid_but_sparse_only() {
        let mut config = PfSpinnConfig::default();
        assert!(config.decoder.fits_dense_store());

        config.decoder.address_bits = 32;
        assert!(validate_config(&config).is_ok());
        assert!(!config.decoder.fits_dense_store());
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = PfSpinnConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
