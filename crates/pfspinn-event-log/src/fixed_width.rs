// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Loader for `<hi>;<lo>;<t0>,<t1>,...` spike logs
//!
//! Each line names a slot through a split address and carries the complete
//! integer spike list for that slot. A later line for the same slot replaces
//! the earlier list.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub use pfspinn_config::MAX_TABLE_BITS;
use pfspinn_config::FixedWidthConfig;

use crate::diagnostics::DecodeDiagnostics;
use crate::error::{EventLogError, MalformedReason, Result};

const FIELD_COUNT: usize = 3;

/// Flat table of integer spike lists indexed by `lo + (hi << hi_shift)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedWidthTable {
    slots: Vec<Vec<u64>>,
}

impl FixedWidthTable {
    pub fn new(table_size: usize) -> Self {
        Self {
            slots: vec![Vec::new(); table_size],
        }
    }

    /// Spike list of `address`; empty when unset or outside the table
    pub fn get(&self, address: usize) -> &[u64] {
        self.slots.get(address).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Replace the list stored at `address`
    ///
    /// Returns false if the address is outside the table.
    pub fn set(&mut self, address: usize, times: Vec<u64>) -> bool {
        match self.slots.get_mut(address) {
            Some(slot) => {
                *slot = times;
                true
            }
            None => false,
        }
    }

    /// Slots holding at least one spike, in address order
    pub fn iter_populated(&self) -> impl Iterator<Item = (usize, &[u64])> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_empty())
            .map(|(address, slot)| (address, slot.as_slice()))
    }

    pub fn into_inner(self) -> Vec<Vec<u64>> {
        self.slots
    }
}

/// Table plus the diagnostics gathered while filling it
#[derive(Debug, Clone)]
pub struct FixedWidthLoad {
    pub table: FixedWidthTable,
    pub diagnostics: DecodeDiagnostics,
}

/// A successfully parsed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAssignment {
    pub address: u64,
    pub times: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct FixedWidthLoader {
    config: FixedWidthConfig,
}

impl FixedWidthLoader {
    /// # Errors
    /// `InvalidConfig` if `table_bits` is not in `1..=24` or `hi_shift` is 32 or more.
    pub fn new(config: FixedWidthConfig) -> Result<Self> {
        if config.table_bits == 0 || config.table_bits > MAX_TABLE_BITS {
            return Err(EventLogError::InvalidConfig(format!(
                "table_bits must be in 1..={}, got {}",
                MAX_TABLE_BITS, config.table_bits
            )));
        }
        if config.hi_shift >= 32 {
            return Err(EventLogError::InvalidConfig(format!(
                "hi_shift must be below 32, got {}",
                config.hi_shift
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &FixedWidthConfig {
        &self.config
    }

    /// Flat slot index for a split address
    ///
    /// `None` if the combination overflows 64 bits.
    pub fn address(&self, hi: u64, lo: u64) -> Option<u64> {
        hi.checked_mul(1u64 << self.config.hi_shift)?.checked_add(lo)
    }

    /// Parse one line
    ///
    /// `Ok(None)` for a blank line or an empty time list, both of which leave
    /// the table untouched.
    pub fn parse_line(
        &self,
        line: &str,
    ) -> std::result::Result<Option<SlotAssignment>, MalformedReason> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(None);
        }

        let fields: Vec<&str> = line.splitn(FIELD_COUNT, ';').collect();
        if fields.len() < FIELD_COUNT {
            return Err(MalformedReason::MissingFields {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        let hi = parse_field(fields[0], 0)?;
        let lo = parse_field(fields[1], 1)?;
        let table_size = self.config.table_size();
        let address = self
            .address(hi, lo)
            .filter(|address| *address < table_size)
            .ok_or_else(|| MalformedReason::AddressOutOfRange {
                address: lo.saturating_add(hi.saturating_mul(1u64 << self.config.hi_shift)),
                table_size,
            })?;

        let list = fields[2].trim().trim_end_matches(',');
        if list.trim().is_empty() {
            return Ok(None);
        }
        let times = list
            .split(',')
            .enumerate()
            .map(|(index, token)| parse_field(token, FIELD_COUNT - 1 + index))
            .collect::<std::result::Result<Vec<u64>, _>>()?;

        Ok(Some(SlotAssignment { address, times }))
    }

    /// Fill `table` from `reader`, overwriting slots named by later lines
    pub fn load_reader_into<R: BufRead>(
        &self,
        reader: R,
        table: &mut FixedWidthTable,
    ) -> Result<DecodeDiagnostics> {
        let mut diagnostics = DecodeDiagnostics::default();

        for (index, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes?;
            let line = String::from_utf8_lossy(&bytes);
            diagnostics.lines_read += 1;

            match self.parse_line(&line) {
                Ok(Some(assignment)) => {
                    let count = assignment.times.len();
                    if table.set(assignment.address as usize, assignment.times) {
                        diagnostics.slots_written += 1;
                        diagnostics.events_decoded += count;
                    } else {
                        diagnostics.record_malformed(
                            MalformedReason::AddressOutOfRange {
                                address: assignment.address,
                                table_size: table.len() as u64,
                            }
                            .at_line(index + 1),
                        );
                    }
                }
                Ok(None) => {}
                Err(reason) => diagnostics.record_malformed(reason.at_line(index + 1)),
            }
        }

        Ok(diagnostics)
    }

    /// Load `reader` into a fresh table
    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<FixedWidthLoad> {
        let mut table = FixedWidthTable::new(self.config.table_size() as usize);
        let diagnostics = self.load_reader_into(reader, &mut table)?;
        Ok(FixedWidthLoad { table, diagnostics })
    }

    /// # Errors
    /// `SourceUnavailable` if the file cannot be opened or read.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<FixedWidthLoad> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EventLogError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let load = self
            .load_reader(BufReader::new(file))
            .map_err(|e| match e {
                EventLogError::Read(source) => EventLogError::SourceUnavailable {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })?;

        tracing::info!(
            "Loaded {} slots ({} spikes) from {} ({} malformed lines)",
            load.diagnostics.slots_written,
            load.diagnostics.events_decoded,
            path.display(),
            load.diagnostics.malformed_lines
        );
        Ok(load)
    }
}

fn parse_field(token: &str, position: usize) -> std::result::Result<u64, MalformedReason> {
    token
        .trim()
        .parse::<u64>()
        .map_err(|_| MalformedReason::InvalidToken {
            position,
            token: token.to_string(),
        })
}

/// Load a fixed-width spike log with the default `2^20`-slot table
///
/// # Errors
/// `SourceUnavailable` if the file cannot be opened or read.
pub fn load_spike_train(path: impl AsRef<Path>) -> Result<FixedWidthLoad> {
    FixedWidthLoader::new(FixedWidthConfig::default())?.load(path)
}
