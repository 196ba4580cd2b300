// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `pfspinn_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Seconds per hardware timestamp tick (80 ns)
pub const DEFAULT_UNIT_SCALE: f64 = 0.000_000_080;

/// Decoded addresses are 17 bits wide; the default store is deliberately larger.
pub const DEFAULT_ADDRESS_BITS: u32 = 20;

/// 24-bit hardware timestamp counter
pub const DEFAULT_MAX_TIMESTAMP: u32 = 0x00FF_FFFF;

/// Fixed factor applied on top of `unit_scale` (seconds to milliseconds)
pub const UNIT_CONVERSION: f64 = 1000.0;

/// Largest fixed-width table (`2^24` slots)
pub const MAX_TABLE_BITS: u32 = 24;

/// Widest address space a dense spike train table is allocated for.
/// Wider spaces (up to 32 bits) are only served by the sparse store.
pub const MAX_DENSE_ADDRESS_BITS: u32 = 24;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PfSpinnConfig {
    pub decoder: DecoderConfig,
    pub fixed_width: FixedWidthConfig,
    pub logging: LoggingConfig,
}

/// Parameters for the parenthesized event log decoder
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Event window size. Carried through untouched; no decoder uses it yet.
    pub window_size: u32,
    /// Seconds per timestamp tick
    pub unit_scale: f64,
    /// log2 of the output address space
    pub address_bits: u32,
    /// Timestamp counter wrap modulus
    pub max_timestamp: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            window_size: 0,
            unit_scale: DEFAULT_UNIT_SCALE,
            address_bits: DEFAULT_ADDRESS_BITS,
            max_timestamp: DEFAULT_MAX_TIMESTAMP,
        }
    }
}

impl DecoderConfig {
    /// Multiplier applied to wrap-corrected ticks (`unit_scale * 1000`)
    pub fn output_scale(&self) -> f64 {
        self.unit_scale * UNIT_CONVERSION
    }

    /// Number of addressable spike trains (`2^address_bits`)
    pub fn address_space(&self) -> u64 {
        1u64 << self.address_bits.min(63)
    }

    /// Whether a dense table can be allocated for this address space
    pub fn fits_dense_store(&self) -> bool {
        self.address_bits <= MAX_DENSE_ADDRESS_BITS
    }
}

/// Parameters for the `<hi>;<lo>;<times>` fixed-width log loader
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FixedWidthConfig {
    /// log2 of the table size
    pub table_bits: u32,
    /// Left shift applied to the `hi` field when forming the flat index
    pub hi_shift: u32,
}

impl Default for FixedWidthConfig {
    fn default() -> Self {
        Self {
            table_bits: 20,
            hi_shift: 9,
        }
    }
}

impl FixedWidthConfig {
    pub fn table_size(&self) -> u64 {
        1u64 << self.table_bits.min(63)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
    /// Crates to raise to debug level
    pub debug_crates: Vec<String>,
    /// Write per-crate log files in addition to the console
    pub file_logging: bool,
    pub log_dir: PathBuf,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug_crates: Vec::new(),
            file_logging: false,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}
