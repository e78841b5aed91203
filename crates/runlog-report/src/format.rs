// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Structured formatting of segmented logs
//!
//! Turns a [`ParsedLog`] into renderer-ready blocks without changing its
//! segmentation. Each line goes through three passes, in this order:
//!
//! 1. reserved markup characters are escaped, exactly once;
//! 2. screenshot paths in the escaped text become [`Segment::Image`] tokens;
//! 3. the remaining text is annotated with keyword [`Highlight`] spans.
//!
//! Later passes never re-escape what an earlier pass produced.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use runlog_parser::{LogLine, ParsedLog, Step};
use serde::{Deserialize, Serialize};

use crate::model::ExecutionRecord;
use crate::status::{ExecutionStatus, status_label};

/// Title of the initialization block
pub const INIT_TITLE: &str = "初始化";
/// Title of the end block
pub const END_TITLE: &str = "测试完成与清理";

const DEFAULT_IMAGE_ROOT: &str = "IMG_LOGS";

/// Formatter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Directory prefix for screenshot display paths
    pub image_root: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            image_root: DEFAULT_IMAGE_ROOT.to_string(),
        }
    }
}

impl FormatOptions {
    /// Create options with the given image root
    #[must_use]
    pub fn new(image_root: impl Into<String>) -> Self {
        Self {
            image_root: image_root.into(),
        }
    }

    /// Display path for a screenshot: the image root joined with the file name
    #[must_use]
    pub fn display_path(&self, path: &str) -> String {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let root = self.image_root.trim_end_matches(['/', '\\']);
        if root.is_empty() {
            file_name.to_string()
        } else {
            format!("{root}/{file_name}")
        }
    }
}

// ============================================================================
// Escaping
// ============================================================================

/// Escape `& < > " '` as character entities
#[must_use]
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// Keyword annotation
// ============================================================================

/// Class of an annotated span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    /// `YYYY-MM-DD HH:MM:SS`
    Timestamp,
    /// Informational level
    Info,
    /// Warning level
    Warning,
    /// Error level
    Error,
    /// Debug level
    Debug,
    /// Pass keyword
    Pass,
    /// Fail keyword
    Fail,
}

/// An annotated byte range of a text segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Span class
    pub kind: HighlightKind,
    /// Start byte offset in the segment text
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

static HIGHLIGHT_RULES: LazyLock<Vec<(HighlightKind, Regex)>> = LazyLock::new(|| {
    [
        (
            HighlightKind::Timestamp,
            r"[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}",
        ),
        (HighlightKind::Info, r"INFO|信息"),
        (HighlightKind::Warning, r"WARNING|警告"),
        (HighlightKind::Error, r"ERROR|错误"),
        (HighlightKind::Debug, r"DEBUG|调试"),
        (HighlightKind::Pass, r"成功|通过|PASSED"),
        (HighlightKind::Fail, r"失败|错误|FAILED"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Keyword spans in `text`, sorted by offset
///
/// Rules are tried in order; a match overlapping an earlier span is dropped.
#[must_use]
pub fn highlight(text: &str) -> Vec<Highlight> {
    let mut spans: Vec<Highlight> = Vec::new();
    for (kind, re) in HIGHLIGHT_RULES.iter() {
        for m in re.find_iter(text) {
            let overlaps = spans.iter().any(|s| m.start() < s.end && s.start < m.end());
            if !overlaps {
                spans.push(Highlight {
                    kind: *kind,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }
    }
    spans.sort_by_key(|s| s.start);
    spans
}

// ============================================================================
// Lines
// ============================================================================

/// A piece of a formatted line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Escaped text with keyword spans
    Text {
        /// Escaped text
        text: String,
        /// Keyword spans over `text`
        highlights: Vec<Highlight>,
    },
    /// A screenshot reference
    Image {
        /// Path as written in the log
        path: String,
        /// Resolved display path
        display_path: String,
    },
}

/// One log line, formatted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedLine {
    /// Source line index
    pub index: usize,
    /// Text and image pieces in order
    pub segments: Vec<Segment>,
}

impl FormattedLine {
    /// Whether the line contains a screenshot reference
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Image { .. }))
    }
}

/// Format one line, replacing every occurrence of `image_paths`
#[must_use]
pub fn format_line(
    line: &LogLine,
    image_paths: &[&str],
    options: &FormatOptions,
) -> FormattedLine {
    let escaped = escape_markup(&line.text);

    // (start, end, path) of each image occurrence in the escaped text
    let mut images: Vec<(usize, usize, &str)> = Vec::new();
    for &path in image_paths.iter().filter(|p| !p.is_empty()) {
        let needle = escape_markup(path);
        for (start, found) in escaped.match_indices(needle.as_str()) {
            let end = start + found.len();
            if !images.iter().any(|&(s, e, _)| start < e && s < end) {
                images.push((start, end, path));
            }
        }
    }
    images.sort_by_key(|&(start, _, _)| start);

    let mut segments = Vec::new();
    let mut cursor = 0;
    for (start, end, path) in images {
        push_text(&mut segments, &escaped[cursor..start]);
        segments.push(Segment::Image {
            path: path.to_string(),
            display_path: options.display_path(path),
        });
        cursor = end;
    }
    push_text(&mut segments, &escaped[cursor..]);

    FormattedLine {
        index: line.index,
        segments,
    }
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Text {
            text: text.to_string(),
            highlights: highlight(text),
        });
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// Kind of phase block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Lines before the first step
    Init,
    /// A numbered step
    Step,
    /// Lines after completion (the step "end-marker")
    End,
}

/// One method's lines within a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodPanel {
    /// Method name
    pub method: String,
    /// The method's rail, formatted
    pub lines: Vec<FormattedLine>,
}

/// A renderer-ready phase of one execution log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBlock {
    /// Block kind
    pub kind: BlockKind,
    /// Step number, for step blocks
    pub number: Option<u32>,
    /// Block title
    pub title: String,
    /// Lines in the block
    pub line_count: usize,
    /// Methods with a rail in the block
    pub method_count: usize,
    /// Every line of the block, in scan order
    pub lines: Vec<FormattedLine>,
    /// Per-method panels; empty when the block has no method rails
    pub methods: Vec<MethodPanel>,
}

/// Formatted phases of one execution log
pub type FormattedBlocks = Vec<PhaseBlock>;

/// Numeric suffix of a `test_SC_<n>` method name
fn sc_number(method: &str) -> Option<u64> {
    method.strip_prefix("test_SC_")?.parse().ok()
}

/// Order method names: `test_SC_<n>` by `n`, then the rest lexicographically
pub fn sort_methods(methods: &mut [&str]) {
    methods.sort_by_key(|m| (sc_number(m).map_or((1, 0), |n| (0, n)), *m));
}

struct LineFormatter<'a> {
    images: BTreeMap<usize, Vec<&'a str>>,
    options: &'a FormatOptions,
}

impl<'a> LineFormatter<'a> {
    fn new(log: &'a ParsedLog, options: &'a FormatOptions) -> Self {
        let mut images: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for shot in &log.screenshots {
            images
                .entry(shot.source_line.index)
                .or_default()
                .push(shot.path.as_str());
        }
        Self { images, options }
    }

    fn line(&self, line: &LogLine) -> FormattedLine {
        let paths = self
            .images
            .get(&line.index)
            .map(Vec::as_slice)
            .unwrap_or_default();
        format_line(line, paths, self.options)
    }

    fn lines(&self, lines: &[LogLine]) -> Vec<FormattedLine> {
        lines.iter().map(|l| self.line(l)).collect()
    }

    fn flat_block(&self, kind: BlockKind, title: &str, lines: &[LogLine]) -> PhaseBlock {
        PhaseBlock {
            kind,
            number: None,
            title: title.to_string(),
            line_count: lines.len(),
            method_count: 0,
            lines: self.lines(lines),
            methods: Vec::new(),
        }
    }

    fn step_block(&self, step: &Step) -> PhaseBlock {
        let mut methods: Vec<&str> = step.method_rail.keys().map(String::as_str).collect();
        sort_methods(&mut methods);

        PhaseBlock {
            kind: BlockKind::Step,
            number: Some(step.number),
            title: format!("测试步骤 {}：{}", step.number, step.name),
            line_count: step.lines.len(),
            method_count: step.method_count(),
            lines: self.lines(&step.lines),
            methods: methods
                .into_iter()
                .map(|method| MethodPanel {
                    method: method.to_string(),
                    lines: self.lines(step.rail(method)),
                })
                .collect(),
        }
    }
}

/// Format a segmented log into phase blocks
///
/// Emits an init block when there are init lines, one block per step in
/// order, and an end block when there are end lines.
#[must_use]
pub fn format_log(log: &ParsedLog, options: &FormatOptions) -> FormattedBlocks {
    let formatter = LineFormatter::new(log, options);
    let mut blocks = Vec::with_capacity(log.steps.len() + 2);

    if !log.init_lines.is_empty() {
        blocks.push(formatter.flat_block(BlockKind::Init, INIT_TITLE, &log.init_lines));
    }
    blocks.extend(log.steps.iter().map(|step| formatter.step_block(step)));
    if !log.end_lines.is_empty() {
        blocks.push(formatter.flat_block(BlockKind::End, END_TITLE, &log.end_lines));
    }
    blocks
}

// ============================================================================
// Executions
// ============================================================================

/// One execution, formatted for the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedExecution {
    /// Renderer-safe key
    pub key: String,
    /// Status class
    pub status: ExecutionStatus,
    /// Status label
    pub status_label: String,
    /// Start time, as sent
    pub start_time: String,
    /// End time, as sent
    pub end_time: String,
    /// Parsed start time
    pub started_at: Option<NaiveDateTime>,
    /// Parsed end time
    pub ended_at: Option<NaiveDateTime>,
    /// Who started the execution
    pub executor: String,
    /// Steps in the log
    pub step_count: usize,
    /// Concurrent methods in the log
    pub method_count: usize,
    /// Screenshots in the log
    pub screenshot_count: usize,
    /// Formatted phases
    pub blocks: FormattedBlocks,
}

/// Format one execution; `index` is its position among its siblings
#[must_use]
pub fn format_execution(
    execution: &ExecutionRecord,
    index: usize,
    options: &FormatOptions,
) -> FormattedExecution {
    let log = execution.parsed_log();
    FormattedExecution {
        key: execution.key(index),
        status: execution.status(),
        status_label: status_label(&execution.status),
        start_time: execution.start_time.clone(),
        end_time: execution.end_time.clone(),
        started_at: execution.started_at(),
        ended_at: execution.ended_at(),
        executor: execution.executed_by.clone(),
        step_count: log.step_count,
        method_count: log.method_count,
        screenshot_count: log.screenshots.len(),
        blocks: format_log(log, options),
    }
}

/// Format a list of executions
#[must_use]
pub fn format_executions(
    executions: &[ExecutionRecord],
    options: &FormatOptions,
) -> Vec<FormattedExecution> {
    executions
        .iter()
        .enumerate()
        .map(|(index, execution)| format_execution(execution, index, options))
        .collect()
}
