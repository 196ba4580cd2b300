// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # pfspinn Event Log
//!
//! Decoders that turn recorded sensor event logs into per-address spike trains.
//!
//! - [`load_vbottle`]: parenthesized `(ts ev ts ev ...)` logs with timestamp
//!   wraparound correction and rescaling to output time units
//! - [`load_spike_train`]: `<hi>;<lo>;<t0>,<t1>,...` logs into a flat table
//!
//! Both read line by line, skip and count malformed lines, and report an
//! unreadable source as [`EventLogError::SourceUnavailable`].
//!
//! ## Streaming
//!
//! [`VBottleDecoder::decode_reader`] pushes spikes into any [`SpikeSink`],
//! so large logs can be processed without a dense `2^address_bits` table.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod diagnostics;
pub mod error;
pub mod event;
pub mod fixed_width;
pub mod parse;
pub mod spike_train;
pub mod vbottle;
pub mod wrap;

pub use diagnostics::{DecodeDiagnostics, MAX_RECORDED_ISSUES};
pub use error::{EventLogError, MalformedReason, MalformedRecord, Result};
pub use event::{EventRecord, EventWord, ADDRESS_MASK, ADDRESS_WIDTH};
pub use fixed_width::{
    load_spike_train, FixedWidthLoad, FixedWidthLoader, FixedWidthTable, SlotAssignment,
};
pub use parse::{extract_parenthesized, parse_event_pairs, ParsedLine};
pub use spike_train::{
    DenseSpikeTrains, FnSink, SparseSpikeTrains, SpikeSink, SpikeTrainStore,
    MAX_DENSE_ADDRESS_BITS,
};
pub use vbottle::{load_vbottle, load_vbottle_sparse, DecodedLog, LineOutcome, VBottleDecoder};
pub use wrap::{Timebase, WrapState};
