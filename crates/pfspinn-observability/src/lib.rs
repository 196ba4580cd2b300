// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # pfspinn-observability
//!
//! Logging infrastructure shared by the pfspinn crates.
//!
//! Library crates only emit `tracing` events; binaries and test harnesses
//! decide where they go by calling one of the initializers here.
//!
//! ## Features
//! - `file-logging`: Per-crate JSON log files with run folders and retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known pfspinn crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "pfspinn",
    "pfspinn-config",
    "pfspinn-event-log",
    "pfspinn-observability",
];
