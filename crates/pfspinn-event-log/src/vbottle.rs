// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Decoder for parenthesized event logs
//!
//! Each line carries `( ts0 ev0 ts1 ev1 ... )`. Records are folded through a
//! [`WrapState`] in log order, rescaled by a [`Timebase`], and appended to the
//! spike train of the address decoded from the event word.
//!
//! ```rust,no_run
//! use pfspinn_config::DecoderConfig;
//! use pfspinn_event_log::{load_vbottle, SpikeTrainStore};
//!
//! let decoded = load_vbottle("recording.log", &DecoderConfig::default())?;
//! println!("{} malformed lines", decoded.diagnostics.malformed_lines);
//! println!("pixel 42: {:?}", decoded.spike_trains.spike_train(42));
//! # Ok::<(), pfspinn_event_log::EventLogError>(())
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use pfspinn_config::DecoderConfig;

use crate::diagnostics::DecodeDiagnostics;
use crate::error::{EventLogError, Result};
use crate::event::ADDRESS_WIDTH;
use crate::parse::{extract_parenthesized, parse_event_pairs};
use crate::spike_train::{DenseSpikeTrains, SparseSpikeTrains, SpikeSink, SpikeTrainStore};
use crate::wrap::{Timebase, WrapState};

/// Spike trains plus the diagnostics gathered while producing them
#[derive(Debug, Clone)]
pub struct DecodedLog<S> {
    pub spike_trains: S,
    pub diagnostics: DecodeDiagnostics,
}

impl<S> DecodedLog<S> {
    pub fn into_parts(self) -> (S, DecodeDiagnostics) {
        (self.spike_trains, self.diagnostics)
    }
}

/// What a single line contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineOutcome {
    /// The line had a `( ... )` span
    pub parenthesized: bool,
    /// Spikes delivered to the sink
    pub events: usize,
    /// Records whose address fell outside the address space
    pub out_of_range: usize,
    pub unpaired_token: bool,
}

/// Event log decoder bound to one validated [`DecoderConfig`]
#[derive(Debug, Clone)]
pub struct VBottleDecoder {
    config: DecoderConfig,
    timebase: Timebase,
    address_space: u64,
}

impl VBottleDecoder {
    /// # Errors
    /// `InvalidConfig` if the scale is not a positive finite number, the
    /// address space is not 1..=32 bits, or the wrap modulus is zero.
    pub fn new(config: DecoderConfig) -> Result<Self> {
        if !config.unit_scale.is_finite() || config.unit_scale <= 0.0 {
            return Err(EventLogError::InvalidConfig(format!(
                "unit_scale must be finite and positive, got {}",
                config.unit_scale
            )));
        }
        if config.address_bits == 0 || config.address_bits > 32 {
            return Err(EventLogError::InvalidConfig(format!(
                "address_bits must be in 1..=32, got {}",
                config.address_bits
            )));
        }
        if config.max_timestamp == 0 {
            return Err(EventLogError::InvalidConfig(
                "max_timestamp (wrap modulus) must be non-zero".to_string(),
            ));
        }
        if config.address_bits < ADDRESS_WIDTH {
            tracing::warn!(
                "address_bits = {} is narrower than the {}-bit event address; some events will be dropped",
                config.address_bits,
                ADDRESS_WIDTH
            );
        }

        Ok(Self {
            timebase: Timebase::from_config(&config),
            address_space: config.address_space(),
            config,
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn timebase(&self) -> Timebase {
        self.timebase
    }

    pub fn address_space(&self) -> u64 {
        self.address_space
    }

    /// Decode one line, threading the wrap state through
    ///
    /// A line without a parenthesized span yields an empty outcome. A line with
    /// a bad token is rejected before any of its records touch `state`.
    ///
    /// # Errors
    /// `MalformedRecord` tagged with `line_number`.
    pub fn decode_line<S: SpikeSink + ?Sized>(
        &self,
        state: &mut WrapState,
        line_number: usize,
        line: &str,
        sink: &mut S,
    ) -> Result<LineOutcome> {
        let Some(body) = extract_parenthesized(line) else {
            return Ok(LineOutcome::default());
        };
        let parsed = parse_event_pairs(body).map_err(|reason| reason.at_line(line_number))?;

        let mut outcome = LineOutcome {
            parenthesized: true,
            unpaired_token: parsed.unpaired_token.is_some(),
            ..LineOutcome::default()
        };

        for record in &parsed.records {
            let ticks = state.advance(record.timestamp, self.config.max_timestamp);
            let address = record.address();
            if u64::from(address) >= self.address_space {
                outcome.out_of_range += 1;
                continue;
            }
            sink.push_spike(address, self.timebase.to_output(ticks));
            outcome.events += 1;
        }

        Ok(outcome)
    }

    /// Stream every spike of `reader` into `sink`
    ///
    /// Malformed lines are counted and skipped. Lines are split on `\n`;
    /// invalid UTF-8 is replaced before parsing, which makes the affected
    /// tokens fail as malformed rather than aborting the read.
    pub fn decode_reader<R: BufRead, S: SpikeSink + ?Sized>(
        &self,
        reader: R,
        sink: &mut S,
    ) -> Result<DecodeDiagnostics> {
        let mut state = WrapState::new();
        let mut diagnostics = DecodeDiagnostics::default();

        for (index, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes?;
            let line = String::from_utf8_lossy(&bytes);
            diagnostics.lines_read += 1;

            match self.decode_line(&mut state, index + 1, &line, &mut *sink) {
                Ok(outcome) => {
                    if !outcome.parenthesized {
                        diagnostics.unparenthesized_lines += 1;
                    }
                    if outcome.unpaired_token {
                        diagnostics.unpaired_tokens += 1;
                    }
                    diagnostics.events_decoded += outcome.events;
                    diagnostics.out_of_range_events += outcome.out_of_range;
                }
                Err(EventLogError::MalformedRecord(record)) => diagnostics.record_malformed(record),
                Err(e) => return Err(e),
            }
        }

        diagnostics.wraps = state.wraps();
        Ok(diagnostics)
    }

    /// Decode `reader` into a freshly allocated store
    pub fn decode_into<S: SpikeTrainStore, R: BufRead>(&self, reader: R) -> Result<DecodedLog<S>> {
        let mut spike_trains = S::with_address_space(self.address_space)?;
        let diagnostics = self.decode_reader(reader, &mut spike_trains)?;
        Ok(DecodedLog {
            spike_trains,
            diagnostics,
        })
    }

    /// Decode an in-memory log into a dense table
    pub fn decode_str(&self, text: &str) -> Result<DecodedLog<DenseSpikeTrains>> {
        self.decode_into(text.as_bytes())
    }

    /// Stream a log file into `sink` without materializing the address space
    ///
    /// # Errors
    /// `SourceUnavailable` if the file cannot be opened or read.
    pub fn stream_file<S: SpikeSink + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        sink: &mut S,
    ) -> Result<DecodeDiagnostics> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EventLogError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Decoding event log {}", path.display());

        let diagnostics = self
            .decode_reader(BufReader::new(file), sink)
            .map_err(|e| match e {
                EventLogError::Read(source) => EventLogError::SourceUnavailable {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })?;

        tracing::info!(
            "Decoded {} events from {} lines of {} ({} malformed, {} without events span, {} wraps)",
            diagnostics.events_decoded,
            diagnostics.lines_read,
            path.display(),
            diagnostics.malformed_lines,
            diagnostics.unparenthesized_lines,
            diagnostics.wraps
        );
        Ok(diagnostics)
    }

    /// Load a log file into a store of the caller's choice
    pub fn load<S: SpikeTrainStore>(&self, path: impl AsRef<Path>) -> Result<DecodedLog<S>> {
        let mut spike_trains = S::with_address_space(self.address_space)?;
        let diagnostics = self.stream_file(path, &mut spike_trains)?;
        Ok(DecodedLog {
            spike_trains,
            diagnostics,
        })
    }
}

/// Decode an event log file into a dense `2^address_bits` table
///
/// # Errors
/// `SourceUnavailable` if the file cannot be opened or read, `InvalidConfig`
/// for a rejected configuration.
pub fn load_vbottle(
    path: impl AsRef<Path>,
    config: &DecoderConfig,
) -> Result<DecodedLog<DenseSpikeTrains>> {
    VBottleDecoder::new(config.clone())?.load(path)
}

/// Decode an event log file, keeping only addresses that fired
pub fn load_vbottle_sparse(
    path: impl AsRef<Path>,
    config: &DecoderConfig,
) -> Result<DecodedLog<SparseSpikeTrains>> {
    VBottleDecoder::new(config.clone())?.load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spike_train::FnSink;

    fn decoder_with(max_timestamp: u32, unit_scale: f64) -> VBottleDecoder {
        VBottleDecoder::new(DecoderConfig {
            max_timestamp,
            unit_scale,
            ..DecoderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_two_event_line() {
        let decoder = VBottleDecoder::new(DecoderConfig::default()).unwrap();
        let decoded = decoder.decode_str("(10 2 20 4)").unwrap();

        assert_eq!(decoded.spike_trains.len(), 1 << 20);
        assert_eq!(decoded.spike_trains.spike_train(1), &[0.5]);
        // (20 - 10) ticks scaled, plus the fixed bias
        let second = decoded.spike_trains.spike_train(2);
        assert_eq!(second, &[10.0 * decoder.timebase().scale() + 0.5]);
        assert!((second[0] - (10.0 * 8e-5 + 0.5)).abs() < 1e-12);
        assert_eq!(decoded.diagnostics.events_decoded, 2);
        assert!(decoded.diagnostics.is_clean());
    }

    #[test]
    fn test_first_record_is_half_tick_for_any_scale() {
        for scale in [1e-9, 8e-8, 1e-3, 1.0] {
            let decoded = decoder_with(0xFFFFFF, scale)
                .decode_str("junk (123456 10)")
                .unwrap();
            assert_eq!(decoded.spike_trains.spike_train(5), &[0.5]);
        }
    }

    #[test]
    fn test_wrap_sequence_is_compensated() {
        // Scale 1e-3 s/tick * 1000 = 1 output unit per tick
        let decoder = decoder_with(1000, 1e-3);
        let decoded = decoder.decode_str("(100 2)\n(50 2)\n(30 2)\n").unwrap();

        assert_eq!(decoded.spike_trains.spike_train(1), &[0.5, 950.5, 1930.5]);
        assert_eq!(decoded.diagnostics.wraps, 2);
    }

    #[test]
    fn test_wrap_state_spans_lines() {
        let decoder = decoder_with(1000, 1e-3);
        let mut state = WrapState::new();
        let mut sink = DenseSpikeTrains::new(16);

        decoder.decode_line(&mut state, 1, "(100 2 50 2)", &mut sink).unwrap();
        assert_eq!(state.wrap_ts(), 1000);
        decoder.decode_line(&mut state, 2, "(30 4)", &mut sink).unwrap();
        assert_eq!(state.wrap_ts(), 2000);
        assert_eq!(sink.spike_train(2), &[1930.5]);
    }

    #[test]
    fn test_unparenthesized_lines_are_empty() {
        let decoder = VBottleDecoder::new(DecoderConfig::default()).unwrap();
        let mut state = WrapState::new();
        let mut sink = DenseSpikeTrains::new(8);

        for line in ["", "10 2 20 4", "(10 2", "10 2)"] {
            let outcome = decoder.decode_line(&mut state, 1, line, &mut sink).unwrap();
            assert_eq!(outcome, LineOutcome::default());
        }
        assert_eq!(state, WrapState::new());
        assert_eq!(sink.total_spikes(), 0);
    }

    #[test]
    fn test_malformed_line_leaves_state_untouched() {
        let decoder = decoder_with(1000, 1e-3);
        let mut state = WrapState::new();
        let mut sink = DenseSpikeTrains::new(8);

        decoder.decode_line(&mut state, 1, "(100 2)", &mut sink).unwrap();
        let before = state;
        let err = decoder
            .decode_line(&mut state, 2, "(5 2 oops 2)", &mut sink)
            .unwrap_err();

        assert!(matches!(err, EventLogError::MalformedRecord(ref r) if r.line == 2));
        assert_eq!(state, before);
        assert_eq!(sink.total_spikes(), 1);
    }

    #[test]
    fn test_malformed_lines_are_counted_and_skipped() {
        let decoder = decoder_with(1000, 1e-3);
        let log = "(100 2)\n(1x0 2)\nno events here\n(200 2 7)\n";
        let decoded = decoder.decode_str(log).unwrap();

        let diagnostics = &decoded.diagnostics;
        assert_eq!(diagnostics.lines_read, 4);
        assert_eq!(diagnostics.events_decoded, 2);
        assert_eq!(diagnostics.malformed_lines, 1);
        assert_eq!(diagnostics.issues[0].line, 2);
        assert_eq!(diagnostics.unparenthesized_lines, 1);
        assert_eq!(diagnostics.unpaired_tokens, 1);
        assert_eq!(decoded.spike_trains.spike_train(1), &[0.5, 100.5]);
    }

    #[test]
    fn test_invalid_utf8_is_malformed_not_fatal() {
        let decoder = decoder_with(1000, 1e-3);
        let mut sink = DenseSpikeTrains::new(8);
        let bytes: &[u8] = b"(1 2)\n(\xff 2)\n(3 2)\n";

        let diagnostics = decoder.decode_reader(bytes, &mut sink).unwrap();

        assert_eq!(diagnostics.malformed_lines, 1);
        assert_eq!(sink.spike_train(1), &[0.5, 2.5]);
    }

    #[test]
    fn test_out_of_range_addresses_counted() {
        let decoder = VBottleDecoder::new(DecoderConfig {
            address_bits: 4,
            unit_scale: 1e-3,
            ..DecoderConfig::default()
        })
        .unwrap();
        // Address 1 fits in 16 slots, address 100 does not
        let decoded = decoder.decode_str("(10 2 20 200 30 2)").unwrap();

        assert_eq!(decoded.spike_trains.len(), 16);
        assert_eq!(decoded.diagnostics.out_of_range_events, 1);
        assert_eq!(decoded.spike_trains.spike_train(1), &[0.5, 20.5]);
    }

    #[test]
    fn test_stream_into_callback() {
        let decoder = decoder_with(1000, 1e-3);
        let mut seen = Vec::new();
        let diagnostics = decoder
            .decode_reader(
                "(10 2 20 4)\n(5 6)".as_bytes(),
                &mut FnSink(|a: u32, t: f64| seen.push((a, t))),
            )
            .unwrap();

        assert_eq!(diagnostics.events_decoded, 3);
        assert_eq!(diagnostics.wraps, 1);
        assert_eq!(seen, vec![(1, 0.5), (2, 10.5), (3, 995.5)]);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let zero_modulus = DecoderConfig {
            max_timestamp: 0,
            ..DecoderConfig::default()
        };
        assert!(matches!(
            VBottleDecoder::new(zero_modulus),
            Err(EventLogError::InvalidConfig(_))
        ));

        let too_wide = DecoderConfig {
            address_bits: 33,
            ..DecoderConfig::default()
        };
        assert!(VBottleDecoder::new(too_wide).is_err());

        let negative_scale = DecoderConfig {
            unit_scale: -1.0,
            ..DecoderConfig::default()
        };
        assert!(VBottleDecoder::new(negative_scale).is_err());
    }

    #[test]
    fn test_window_size_passes_through() {
        let decoder = VBottleDecoder::new(DecoderConfig {
            window_size: 32,
            ..DecoderConfig::default()
        })
        .unwrap();
        assert_eq!(decoder.config().window_size, 32);
    }
}
