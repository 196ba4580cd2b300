// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::error::MalformedRecord;

/// Number of malformed line details kept per decode; the counters keep going
pub const MAX_RECORDED_ISSUES: usize = 64;

/// Counters collected while decoding one source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodeDiagnostics {
    pub lines_read: usize,
    /// Events (or fixed-width timestamps) delivered to the output
    pub events_decoded: usize,
    /// Fixed-width slots overwritten
    pub slots_written: usize,
    /// Lines without a `( ... )` span
    pub unparenthesized_lines: usize,
    /// Lines skipped because they could not be parsed
    pub malformed_lines: usize,
    /// Trailing tokens without a partner
    pub unpaired_tokens: usize,
    /// Events whose address does not fit the configured address space
    pub out_of_range_events: usize,
    pub wraps: u64,
    /// First [`MAX_RECORDED_ISSUES`] malformed lines
    pub issues: Vec<MalformedRecord>,
}

impl DecodeDiagnostics {
    /// Count a skipped line and keep its details while there is room
    pub fn record_malformed(&mut self, record: MalformedRecord) {
        tracing::warn!("Skipping malformed event log {}", record);
        self.malformed_lines += 1;
        if self.issues.len() < MAX_RECORDED_ISSUES {
            self.issues.push(record);
        }
    }

    /// True when every line decoded without being skipped or truncated
    pub fn is_clean(&self) -> bool {
        self.malformed_lines == 0
            && self.unparenthesized_lines == 0
            && self.unpaired_tokens == 0
            && self.out_of_range_events == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedReason;

    fn bad_line(line: usize) -> MalformedRecord {
        MalformedReason::MissingFields {
            expected: 3,
            found: 1,
        }
        .at_line(line)
    }

    #[test]
    fn test_issue_list_is_capped() {
        let mut diagnostics = DecodeDiagnostics::default();
        for line in 1..=(MAX_RECORDED_ISSUES + 10) {
            diagnostics.record_malformed(bad_line(line));
        }
        assert_eq!(diagnostics.malformed_lines, MAX_RECORDED_ISSUES + 10);
        assert_eq!(diagnostics.issues.len(), MAX_RECORDED_ISSUES);
        assert_eq!(diagnostics.issues[0].line, 1);
        assert!(!diagnostics.is_clean());
    }

    #[test]
    fn test_default_is_clean() {
        assert!(DecodeDiagnostics::default().is_clean());
    }

    #[test]
    fn test_serializes_issue_kind() {
        let mut diagnostics = DecodeDiagnostics::default();
        diagnostics.record_malformed(bad_line(4));

        let value = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(value["malformed_lines"], 1);
        assert_eq!(value["issues"][0]["line"], 4);
        assert_eq!(value["issues"][0]["reason"]["kind"], "missing_fields");
    }
}
