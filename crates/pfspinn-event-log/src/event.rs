// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Event word layout
//!
//! ```text
//!  31        18 17      10 9        1  0
//! ┌────────────┬──────────┬──────────┬───┐
//! │  (unused)  │  y (8b)  │  x (9b)  │ p │
//! └────────────┴──────────┴──────────┴───┘
//!              └──── address (17b) ──┘
//! ```

/// Mask applied to `word >> 1` to get the pixel address
pub const ADDRESS_MASK: u32 = 0x0001_FFFF;

/// Width of the decoded address in bits
pub const ADDRESS_WIDTH: u32 = 17;

const X_MASK: u32 = 0x01FF;
const Y_MASK: u32 = 0x00FF;
const Y_SHIFT: u32 = 10;

/// A raw 32-bit event word as written by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventWord(pub u32);

impl EventWord {
    /// Flat pixel address, `(word >> 1) & 0x1FFFF`
    #[inline]
    pub fn address(self) -> u32 {
        (self.0 >> 1) & ADDRESS_MASK
    }

    #[inline]
    pub fn x(self) -> u32 {
        (self.0 >> 1) & X_MASK
    }

    #[inline]
    pub fn y(self) -> u32 {
        (self.0 >> Y_SHIFT) & Y_MASK
    }

    #[inline]
    pub fn polarity(self) -> u8 {
        (self.0 & 1) as u8
    }
}

impl From<u32> for EventWord {
    fn from(word: u32) -> Self {
        EventWord(word)
    }
}

/// One (timestamp, event word) pair from a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub timestamp: u32,
    pub event: EventWord,
}

impl EventRecord {
    pub fn new(timestamp: u32, event: u32) -> Self {
        Self {
            timestamp,
            event: EventWord(event),
        }
    }

    #[inline]
    pub fn address(&self) -> u32 {
        self.event.address()
    }
}
