// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Parsed log types
//!
//! These are the structures produced by [`crate::segment::segment`]: the
//! chronological phases of one execution log, each step's per-method rails
//! and the screenshot references found along the way.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single line of the raw log, as read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// 0-based index of the line in the source text
    pub index: usize,
    /// Raw line text without its terminator
    pub text: String,
}

impl LogLine {
    /// Create a new log line
    #[must_use]
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Scan phase of the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Before any step header
    Init,
    /// Inside a numbered step
    Step,
    /// After a method announced its completion
    End,
}

/// A numbered test step, possibly revisited by several methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step number from the header
    pub number: u32,
    /// Step name from the header
    pub name: String,
    /// Lines assigned to this step, in scan order
    pub lines: Vec<LogLine>,
    /// Lines of this step grouped by method tag
    pub method_rail: BTreeMap<String, Vec<LogLine>>,
}

impl Step {
    /// Create an empty step
    #[must_use]
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            lines: Vec::new(),
            method_rail: BTreeMap::new(),
        }
    }

    /// Whether this step is identified by the given number and name
    #[must_use]
    pub fn is(&self, number: u32, name: &str) -> bool {
        self.number == number && self.name == name
    }

    /// Whether any line of this step was tagged with `method`
    #[must_use]
    pub fn has_method(&self, method: &str) -> bool {
        self.method_rail.contains_key(method)
    }

    /// Number of distinct methods seen in this step
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.method_rail.len()
    }

    /// Lines tagged with `method`, or an empty slice
    #[must_use]
    pub fn rail(&self, method: &str) -> &[LogLine] {
        self.method_rail
            .get(method)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Append a line to the step, and to the method's rail when tagged
    pub fn push(&mut self, line: LogLine, method: Option<&str>) {
        if let Some(method) = method {
            self.method_rail
                .entry(method.to_string())
                .or_default()
                .push(line.clone());
        }
        self.lines.push(line);
    }
}

/// Which screenshot form produced a [`Screenshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotSource {
    /// `[method] ... 截图成功保存: path.png`
    Confirmed,
    /// Absolute path containing `over_test_<method>_`
    AbsolutePath,
    /// Bare `over_test_<method>_....png` file name
    BarePath,
    /// `请求测试截图: path.png`
    Requested,
}

/// A screenshot reference extracted from a log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    /// Owning method, when known
    pub method: Option<String>,
    /// Path as written in the log
    pub path: String,
    /// Form the reference was recognized by
    pub source: ScreenshotSource,
    /// Line the reference was found on
    pub source_line: LogLine,
}

/// The segmented form of one execution log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLog {
    /// Lines seen before the first step header
    pub init_lines: Vec<LogLine>,
    /// Steps in the order they were first opened
    pub steps: Vec<Step>,
    /// Lines seen after the completion marker, plus unresolvable screenshot lines
    pub end_lines: Vec<LogLine>,
    /// Screenshot references in scan order
    pub screenshots: Vec<Screenshot>,
    /// Number of steps
    pub step_count: usize,
    /// Number of concurrent methods (declared, or observed from tags)
    pub method_count: usize,
}

impl ParsedLog {
    /// Whether no line was assigned anywhere
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.init_lines.is_empty() && self.steps.is_empty() && self.end_lines.is_empty()
    }

    /// Total number of lines assigned across init, steps and end
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.init_lines.len()
            + self.steps.iter().map(|s| s.lines.len()).sum::<usize>()
            + self.end_lines.len()
    }

    /// Find a step by number and name
    #[must_use]
    pub fn step(&self, number: u32, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.is(number, name))
    }

    /// Every assigned line, init first, then steps in order, then end
    pub fn assigned_lines(&self) -> impl Iterator<Item = &LogLine> {
        self.init_lines
            .iter()
            .chain(self.steps.iter().flat_map(|s| s.lines.iter()))
            .chain(self.end_lines.iter())
    }
}
