// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Line-level parsing for parenthesized event logs
//!
//! A line looks like `<prefix> (<ts0> <ev0> <ts1> <ev1> ...) <suffix>`.
//! Only the first parenthesized span is read.

use crate::error::MalformedReason;
use crate::event::EventRecord;

/// Events parsed from one parenthesized span
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    pub records: Vec<EventRecord>,
    /// Trailing token without a partner, discarded
    pub unpaired_token: Option<u32>,
}

/// Text between the first `(` and the first `)` that follows it
///
/// Returns `None` when either parenthesis is missing.
pub fn extract_parenthesized(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once('(')?;
    let (body, _) = rest.split_once(')')?;
    Some(body)
}

/// Parse `[ts0, ev0, ts1, ev1, ...]` into event records
///
/// Every token must be an unsigned 32-bit integer; the first bad token rejects
/// the whole span so a line is either decoded entirely or not at all.
pub fn parse_event_pairs(body: &str) -> Result<ParsedLine, MalformedReason> {
    let values = body
        .split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token
                .parse::<u32>()
                .map_err(|_| MalformedReason::InvalidToken {
                    position,
                    token: token.to_string(),
                })
        })
        .collect::<Result<Vec<u32>, _>>()?;

    let pairs = values.chunks_exact(2);
    let unpaired_token = pairs.remainder().first().copied();
    let records = pairs
        .map(|pair| EventRecord::new(pair[0], pair[1]))
        .collect();

    Ok(ParsedLine {
        records,
        unpaired_token,
    })
}
