// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Timestamp wraparound correction and output rescaling
//!
//! The sensor counter is monotonic within an epoch and restarts at zero when it
//! overflows. [`WrapState`] is folded over every record of a log in order and
//! turns raw counter values into ticks since the first record.

use pfspinn_config::DecoderConfig;

/// Running wrap-correction state for one log
///
/// Before the first record there is no time origin. The first record seeds
/// both the origin and the previous-timestamp tracker, so it can never be
/// mistaken for a wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WrapState {
    base_ts: Option<u32>,
    wrap_ts: u64,
    pts: u32,
    wraps: u64,
}

impl WrapState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp of the first record, once seen
    pub fn base_ts(&self) -> Option<u32> {
        self.base_ts
    }

    /// Accumulated wrap offset in ticks
    pub fn wrap_ts(&self) -> u64 {
        self.wrap_ts
    }

    /// Last raw timestamp seen
    pub fn previous_ts(&self) -> Option<u32> {
        self.base_ts.map(|_| self.pts)
    }

    /// Number of wraps detected so far
    pub fn wraps(&self) -> u64 {
        self.wraps
    }

    /// Fold one raw timestamp into the state
    ///
    /// A raw value strictly below the previous one means the counter wrapped,
    /// so `max_timestamp` is added to the running offset. Returns the
    /// wrap-corrected tick count relative to the first record.
    pub fn advance(&mut self, raw_ts: u32, max_timestamp: u32) -> i64 {
        let base_ts = match self.base_ts {
            Some(base_ts) => {
                if raw_ts < self.pts {
                    self.wrap_ts += u64::from(max_timestamp);
                    self.wraps += 1;
                }
                base_ts
            }
            None => {
                self.base_ts = Some(raw_ts);
                raw_ts
            }
        };
        self.pts = raw_ts;

        i64::from(raw_ts) + self.wrap_ts as i64 - i64::from(base_ts)
    }
}

/// Converts wrap-corrected ticks into output time units
///
/// Output is `ticks * unit_scale * 1000 + 0.5`. The bias is added to every
/// value, so the first record of a log always lands on exactly `0.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timebase {
    scale: f64,
}

impl Timebase {
    /// Fixed offset added to every output timestamp
    pub const OUTPUT_BIAS: f64 = 0.5;

    pub fn new(output_scale: f64) -> Self {
        Self {
            scale: output_scale,
        }
    }

    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(config.output_scale())
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn to_output(&self, ticks: i64) -> f64 {
        ticks as f64 * self.scale + Self::OUTPUT_BIAS
    }
}
