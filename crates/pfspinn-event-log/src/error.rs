// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Event log decoding errors
///
/// Only `SourceUnavailable`, `Read` and `InvalidConfig` end a decode.
/// `MalformedRecord` is reported per line; the loaders count it and move on.
#[derive(Error, Debug)]
pub enum EventLogError {
    #[error("Source unavailable: {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read event log: {0}")]
    Read(#[from] std::io::Error),

    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] MalformedRecord),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EventLogError>;

/// A log line that could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("line {line}: {reason}")]
pub struct MalformedRecord {
    /// 1-based line number within the source
    pub line: usize,
    pub reason: MalformedReason,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MalformedReason {
    #[error("token {position} ({token:?}) is not an unsigned integer")]
    InvalidToken { position: usize, token: String },

    #[error("expected {expected} ';'-separated fields, found {found}")]
    MissingFields { expected: usize, found: usize },

    #[error("address {address} is outside the table of {table_size} slots")]
    AddressOutOfRange { address: u64, table_size: u64 },
}

impl MalformedReason {
    pub fn at_line(self, line: usize) -> MalformedRecord {
        MalformedRecord { line, reason: self }
    }
}
