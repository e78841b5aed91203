// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! runlog-report: Report hierarchy and log formatting for runlog
//!
//! This library crate takes the report payload of a set of automated test
//! cases, places each test case under the product groups it belongs to and
//! formats every execution's segmented log into renderer-ready blocks.
//!
//! # Example
//!
//! ```
//! use runlog_report::prelude::*;
//!
//! let execution = ExecutionRecord::new("passed", "==== 测试步骤 1：登录 ====\n[test_a] ok");
//! let formatted = format_execution(&execution, 0, &FormatOptions::default());
//! assert_eq!(formatted.status, ExecutionStatus::Success);
//! assert_eq!(formatted.blocks.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod hierarchy;
pub mod model;
pub mod product;
pub mod status;

pub use error::ReportError;
pub use format::{
    FormatOptions, FormattedBlocks, FormattedExecution, format_execution, format_log,
};
pub use hierarchy::{GroupReport, GroupSummary, ReportHierarchy, TestCaseReport};
pub use model::{ExecutionRecord, ReportPayload, TestCaseRecord};
pub use status::{ExecutionStatus, StatusTally};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ReportError;
    pub use crate::format::{
        FormatOptions, FormattedExecution, PhaseBlock, format_execution, format_executions,
        format_log,
    };
    pub use crate::hierarchy::{GroupReport, ReportHierarchy, TestCaseReport};
    pub use crate::model::{ExecutionRecord, ReportPayload, TestCaseRecord};
    pub use crate::product::{ProductGroup, ProductSelection};
    pub use crate::status::{ExecutionStatus, StatusTally};
}
