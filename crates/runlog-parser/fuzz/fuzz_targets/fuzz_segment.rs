// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for log segmentation
//!
//! Segmentation must accept any byte sequence and keep its line accounting
//! consistent.

#![no_main]

use libfuzzer_sys::fuzz_target;

use runlog_parser::segment_bytes;

fuzz_target!(|data: &[u8]| {
    let log = segment_bytes(data);

    assert_eq!(log.step_count, log.steps.len());
    for step in &log.steps {
        let rail_lines: usize = step.method_rail.values().map(Vec::len).sum();
        assert!(rail_lines <= step.lines.len());
    }
});
