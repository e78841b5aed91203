// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! runlog-parser: Execution log segmentation for runlog
//!
//! This library crate turns the free-form text log of one automated test
//! execution into a [`ParsedLog`]: initialization lines, numbered steps with
//! per-method rails, end-of-run lines and the screenshot references found in
//! between.
//!
//! # Example
//!
//! ```
//! use runlog_parser::segment;
//!
//! let log = segment("hello\n==== 测试步骤 1：打开页面 ====\n[test_a] click\n");
//! assert_eq!(log.step_count, 1);
//! assert_eq!(log.method_count, 1);
//! ```

#![warn(missing_docs)]

pub mod log;
pub mod patterns;
pub mod segment;

pub use log::{LogLine, ParsedLog, Phase, Screenshot, ScreenshotSource, Step};
pub use segment::{segment, segment_bytes};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::log::{LogLine, ParsedLog, Screenshot, Step};
    pub use crate::segment::{segment, segment_bytes};
}
