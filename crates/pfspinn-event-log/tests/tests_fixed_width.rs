// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Integration tests for the `<hi>;<lo>;<times>` spike log loader.
*/

mod common;

use common::{create_temp_dir, write_log};
use pfspinn_config::FixedWidthConfig;
use pfspinn_event_log::{load_spike_train, EventLogError, FixedWidthLoader, MalformedReason};

#[test]
fn test_load_spike_train_file() {
    let dir = create_temp_dir();
    let path = write_log(
        &dir,
        "spikes.txt",
        b"3;7;1,2\n0;0;5,\n3;7;100,200,300\n1;511;8,9\n",
    );

    let load = load_spike_train(&path).expect("Failed to load spike log");

    assert_eq!(load.table.len(), 1 << 20);
    // Second line for 3;7 replaces the first
    assert_eq!(load.table.get(1543), &[100, 200, 300]);
    assert_eq!(load.table.get(0), &[5]);
    assert_eq!(load.table.get(1023), &[8, 9]);
    assert_eq!(load.table.iter_populated().count(), 3);

    assert_eq!(load.diagnostics.lines_read, 4);
    assert_eq!(load.diagnostics.slots_written, 4);
    assert_eq!(load.diagnostics.malformed_lines, 0);
}

#[test]
fn test_missing_source_is_reported() {
    let dir = create_temp_dir();
    let missing = dir.path().join("missing.txt");

    match load_spike_train(&missing) {
        Err(EventLogError::SourceUnavailable { path, source }) => {
            assert_eq!(path, missing);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

#[test]
fn test_malformed_lines_do_not_stop_loading() {
    let dir = create_temp_dir();
    let path = write_log(
        &dir,
        "spikes.txt",
        b"3;7;100\n;;\n3;seven;1\n\n4096;0;1\n0;2;3\n",
    );

    let load = load_spike_train(&path).unwrap();

    assert_eq!(load.diagnostics.lines_read, 6);
    assert_eq!(load.diagnostics.malformed_lines, 3);
    assert_eq!(load.diagnostics.slots_written, 2);
    assert_eq!(load.table.get(1543), &[100]);
    assert_eq!(load.table.get(2), &[3]);

    let lines: Vec<usize> = load.diagnostics.issues.iter().map(|i| i.line).collect();
    assert_eq!(lines, vec![2, 3, 5]);
    assert!(matches!(
        load.diagnostics.issues[2].reason,
        MalformedReason::AddressOutOfRange { .. }
    ));
}

#[test]
fn test_loader_with_custom_geometry() {
    let dir = create_temp_dir();
    let path = write_log(&dir, "spikes.txt", b"1;1;10\n15;15;20\n");

    let loader = FixedWidthLoader::new(FixedWidthConfig {
        table_bits: 8,
        hi_shift: 4,
    })
    .unwrap();
    let load = loader.load(&path).unwrap();

    assert_eq!(load.table.len(), 256);
    assert_eq!(load.table.get(17), &[10]);
    assert_eq!(load.table.get(255), &[20]);
}
