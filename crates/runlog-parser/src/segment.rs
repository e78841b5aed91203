// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Log segmentation
//!
//! A single forward pass over the non-blank lines of one execution log. Lines
//! written by several concurrently running methods are interleaved in the
//! input; method tags are the key used to thread them back into the step they
//! belong to.
//!
//! # Example
//!
//! ```
//! use runlog_parser::segment::segment;
//!
//! let log = segment("boot\n==== 测试步骤 1：打开页面 ====\n[test_a] click\n");
//! assert_eq!(log.init_lines.len(), 1);
//! assert_eq!(log.steps[0].name, "打开页面");
//! assert_eq!(log.steps[0].rail("test_a").len(), 1);
//! ```

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::log::{LogLine, ParsedLog, Phase, Screenshot, Step};
use crate::patterns::{self, StepHeader};

/// Segment a complete raw log into phases, steps and method rails
///
/// Never fails: text with no recognizable markers lands in `init_lines`, and
/// empty text yields an empty [`ParsedLog`].
#[must_use]
pub fn segment(raw: &str) -> ParsedLog {
    let mut scan = ScanState::default();
    for (index, text) in raw.lines().enumerate() {
        scan.feed(index, text);
    }
    scan.finish()
}

/// Segment raw bytes, replacing invalid UTF-8 sequences
#[must_use]
pub fn segment_bytes(raw: &[u8]) -> ParsedLog {
    segment(&String::from_utf8_lossy(raw))
}

/// Accumulator threaded through the scan
#[derive(Debug)]
struct ScanState {
    phase: Phase,
    /// All steps ever opened, in opening order. Reentered steps keep their slot.
    steps: Vec<Step>,
    current: Option<usize>,
    init_lines: Vec<LogLine>,
    end_lines: Vec<LogLine>,
    screenshots: Vec<Screenshot>,
    methods: BTreeSet<String>,
    declared_methods: Option<usize>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            phase: Phase::Init,
            steps: Vec::new(),
            current: None,
            init_lines: Vec::new(),
            end_lines: Vec::new(),
            screenshots: Vec::new(),
            methods: BTreeSet::new(),
            declared_methods: None,
        }
    }
}

impl ScanState {
    fn feed(&mut self, index: usize, text: &str) {
        let line = text.trim();
        if line.is_empty() {
            return;
        }

        let tag = patterns::method_tag(line);
        if let Some(method) = tag {
            self.methods.insert(method.to_string());
        }

        if self.declared_methods.is_none() {
            self.declared_methods = patterns::declared_method_count(line);
        }

        let enters_end = patterns::is_completion(line);

        let shot = patterns::match_screenshot(line);
        if let Some(shot) = shot {
            if shot.method_inferred() {
                if let Some(method) = shot.method {
                    self.methods.insert(method.to_string());
                }
            }
            self.screenshots.push(Screenshot {
                method: shot.method.map(str::to_string),
                path: shot.path.to_string(),
                source: shot.source,
                source_line: LogLine::new(index, text),
            });
        }

        if self.phase != Phase::End {
            if let Some(header) = patterns::step_header(line) {
                self.open_step(header);
                return;
            }
        }

        let entry = LogLine::new(index, text);
        match tag {
            Some(method) if shot.is_some() => {
                let target = patterns::step_hint(line)
                    .and_then(|number| self.step_numbered(number))
                    .or_else(|| self.step_with_method(method));
                self.place(target, entry, method);
            }
            Some(method) if self.phase == Phase::End => {
                let target = self.step_with_method(method);
                self.place(target, entry, method);
            }
            _ if self.phase == Phase::End => self.end_lines.push(entry),
            _ => match self.current {
                // A completion line closes its rail; it stays in the step but
                // is not part of the method's own sub-stream.
                Some(idx) => self.steps[idx].push(entry, tag.filter(|_| !enters_end)),
                None => self.init_lines.push(entry),
            },
        }

        if enters_end {
            self.enter_end();
        }
    }

    fn open_step(&mut self, header: StepHeader<'_>) {
        if let Some(idx) = self
            .steps
            .iter()
            .position(|s| s.is(header.number, header.name))
        {
            trace!(number = header.number, name = header.name, "Reentering step");
            self.current = Some(idx);
        } else {
            self.steps.push(Step::new(header.number, header.name));
            self.current = Some(self.steps.len() - 1);
        }
        self.phase = Phase::Step;
    }

    fn enter_end(&mut self) {
        trace!(open_step = ?self.current, "Entering end phase");
        self.current = None;
        self.phase = Phase::End;
    }

    /// The current step if it has this number, else the first step that does
    fn step_numbered(&self, number: u32) -> Option<usize> {
        self.current
            .filter(|&idx| self.steps[idx].number == number)
            .or_else(|| self.steps.iter().position(|s| s.number == number))
    }

    /// The current step if this method already wrote to it, else the most
    /// recent step that has the method on its rail
    fn step_with_method(&self, method: &str) -> Option<usize> {
        self.current
            .filter(|&idx| self.steps[idx].has_method(method))
            .or_else(|| self.steps.iter().rposition(|s| s.has_method(method)))
    }

    fn place(&mut self, target: Option<usize>, entry: LogLine, method: &str) {
        match target {
            Some(idx) => self.steps[idx].push(entry, Some(method)),
            None => self.end_lines.push(entry),
        }
    }

    fn finish(self) -> ParsedLog {
        let method_count = self.declared_methods.unwrap_or(self.methods.len());
        debug!(
            steps = self.steps.len(),
            init = self.init_lines.len(),
            end = self.end_lines.len(),
            screenshots = self.screenshots.len(),
            methods = method_count,
            "Segmented log"
        );

        ParsedLog {
            step_count: self.steps.len(),
            method_count,
            init_lines: self.init_lines,
            steps: self.steps,
            end_lines: self.end_lines,
            screenshots: self.screenshots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn texts(lines: &[LogLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        let log = segment("");
        assert_eq!(log, ParsedLog::default());
        assert_eq!(log.step_count, 0);
        assert_eq!(log.method_count, 0);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let log = segment("\n   \n\t\n");
        assert!(log.is_empty());
    }

    #[test]
    fn test_plain_lines_go_to_init() {
        let log = segment("one\ntwo\n");
        assert_eq!(texts(&log.init_lines), vec!["one", "two"]);
        assert!(log.steps.is_empty());
    }

    #[test]
    fn test_line_indices_count_blank_lines() {
        let log = segment("a\n\nb");
        let indices: Vec<usize> = log.init_lines.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_header_line_is_consumed() {
        let log = segment("==== 测试步骤 1：打开 ====\nbody");
        assert_eq!(log.step_count, 1);
        assert_eq!(texts(&log.steps[0].lines), vec!["body"]);
        assert_eq!(log.line_count(), 1);
    }

    #[test]
    fn test_new_header_opens_new_step() {
        let log = segment(
            "==== 测试步骤 1：打开 ====\n\
             a\n\
             ==== 测试步骤 2：登录 ====\n\
             b",
        );
        assert_eq!(log.step_count, 2);
        assert_eq!(texts(&log.steps[0].lines), vec!["a"]);
        assert_eq!(texts(&log.steps[1].lines), vec!["b"]);
    }

    #[test]
    fn test_same_number_different_name_is_different_step() {
        let log = segment("开始测试步骤1 打开 的操作\na\n开始测试步骤1 关闭 的操作\nb");
        assert_eq!(log.step_count, 2);
    }

    #[test]
    fn test_reentry_resumes_existing_step() {
        let log = segment(
            "==== 测试步骤 2：login ====\n\
             [test_a] typing\n\
             ==== 测试步骤 3：search ====\n\
             [test_c] searching\n\
             ==== 测试步骤 2：login ====\n\
             [test_b] typing",
        );
        assert_eq!(log.step_count, 2);
        let login = log.step(2, "login").expect("login step");
        assert_eq!(login.rail("test_a").len(), 1);
        assert_eq!(login.rail("test_b").len(), 1);
        assert_eq!(texts(&login.lines), vec!["[test_a] typing", "[test_b] typing"]);
        let search = log.step(3, "search").expect("search step");
        assert_eq!(texts(&search.lines), vec!["[test_c] searching"]);
    }

    #[test]
    fn test_completion_enters_end_phase() {
        let log = segment(
            "==== 测试步骤 1：打开 ====\n\
             [test_a] click\n\
             [test_a] test_a 完成\n\
             cleanup",
        );
        assert_eq!(texts(&log.end_lines), vec!["cleanup"]);
        assert_eq!(log.steps[0].rail("test_a").len(), 1);
        assert_eq!(log.steps[0].lines.len(), 2);
    }

    #[test]
    fn test_completion_before_any_step_stays_in_init() {
        let log = segment("[test_a] test_a 完成\nafter");
        assert_eq!(texts(&log.init_lines), vec!["[test_a] test_a 完成"]);
        assert_eq!(texts(&log.end_lines), vec!["after"]);
    }

    #[test]
    fn test_end_phase_is_sticky() {
        let log = segment(
            "==== 测试步骤 1：打开 ====\n\
             [test_a] test_a 完成\n\
             ==== 测试步骤 2：登录 ====\n\
             more",
        );
        assert_eq!(log.step_count, 1);
        assert_eq!(
            texts(&log.end_lines),
            vec!["==== 测试步骤 2：登录 ====", "more"]
        );
    }

    #[test]
    fn test_tagged_line_in_end_phase_returns_to_its_step() {
        let log = segment(
            "==== 测试步骤 1：打开 ====\n\
             [test_a] click\n\
             [test_b] click\n\
             [test_a] test_a 完成\n\
             [test_b] still working\n\
             [test_z] unknown",
        );
        let step = &log.steps[0];
        assert_eq!(texts(step.rail("test_b")), vec!["[test_b] click", "[test_b] still working"]);
        assert_eq!(texts(&log.end_lines), vec!["[test_z] unknown"]);
    }

    #[test]
    fn test_screenshot_resolved_by_step_hint() {
        let log = segment(
            "==== 测试步骤 1：打开 ====\n\
             [test_a] open\n\
             ==== 测试步骤 2：登录 ====\n\
             [test_b] 截图成功保存: /img/测试步骤_step_1_x.png",
        );
        assert_eq!(log.steps[0].rail("test_b").len(), 1);
        assert!(log.steps[1].lines.is_empty());
    }

    #[test]
    fn test_screenshot_resolved_by_earlier_rail() {
        let log = segment(
            "==== 测试步骤 1：打开 ====\n\
             [test_a] open\n\
             ==== 测试步骤 2：登录 ====\n\
             [test_b] typing\n\
             [test_a] 截图成功保存: a.png",
        );
        assert_eq!(texts(log.steps[0].rail("test_a")).len(), 2);
        assert_eq!(texts(log.steps[1].rail("test_b")).len(), 1);
    }

    #[test]
    fn test_unresolvable_screenshot_goes_to_end() {
        let log = segment(
            "==== 测试步骤 1：打开 ====\n\
             [test_a] 截图成功保存: a.png",
        );
        assert!(log.steps[0].lines.is_empty());
        assert_eq!(texts(&log.end_lines), vec!["[test_a] 截图成功保存: a.png"]);
        assert_eq!(log.screenshots.len(), 1);
    }

    #[test]
    fn test_untagged_screenshot_follows_current_step() {
        let log = segment("==== 测试步骤 1：打开 ====\n请求测试截图: a.png");
        assert_eq!(log.steps[0].lines.len(), 1);
        assert_eq!(log.screenshots[0].method, None);
    }

    #[test]
    fn test_inferred_method_counts() {
        let log = segment("wrote over_test_test_q_1.png");
        assert_eq!(log.method_count, 1);
        assert_eq!(log.screenshots[0].method.as_deref(), Some("test_q"));
    }

    #[test]
    fn test_declared_method_count_overrides_tags() {
        let log = segment("开始并发执行 5 个独立浏览器实例\n[test_a] x\n[test_b] y");
        assert_eq!(log.method_count, 5);

        let log = segment("[test_a] x\n[test_b] y\n[test_a] z");
        assert_eq!(log.method_count, 2);
    }

    #[test]
    fn test_segment_bytes_tolerates_invalid_utf8() {
        let log = segment_bytes(b"ok\n\xff\xfe garbage\n");
        assert_eq!(log.init_lines.len(), 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let log = segment("a\r\nb\r\n");
        assert_eq!(texts(&log.init_lines), vec!["a", "b"]);
    }
}
