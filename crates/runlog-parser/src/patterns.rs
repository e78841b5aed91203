// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line pattern matchers
//!
//! Recognizers for the literal marker forms written by the automation runner:
//!
//! - method tags: `[test_login_1] ...`
//! - completion markers: `[test_a] test_a 完成`
//! - step headers: `==== 测试步骤 1：打开页面 ====` or `开始测试步骤2 登录 的操作`
//! - screenshot references (four forms, see [`SCREENSHOT_RULES`])
//! - step hints embedded in screenshot paths: `步骤_step_3_...`, `over_test_step_3_...`
//! - the concurrency banner: `开始并发执行 4 个独立浏览器实例`
//!
//! Rule lists are ordered and evaluated first-match-wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::log::ScreenshotSource;

// ============================================================================
// Regexes
// ============================================================================

// Method identifiers are ASCII word characters after a `test_` prefix.
static METHOD_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(test_[A-Za-z0-9_]+)\]").expect("valid regex"));
static COMPLETION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(test_[A-Za-z0-9_]+)\]\s+(test_[A-Za-z0-9_]+)\s+完成").expect("valid regex")
});

static STEP_HEADER_BRACKETED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^=+\s*测试步骤\s*([0-9]+)[：:]\s*(.+?)\s*=+").expect("valid regex")
});
static STEP_HEADER_NARRATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"开始测试步骤([0-9]+)\s*(.+?)\s*的操作").expect("valid regex")
});

static SHOT_CONFIRMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(test_[A-Za-z0-9_]+)\]\s.*(?:截图成功保存|数据信息保存成功):\s*(\S+\.png)")
        .expect("valid regex")
});
static SHOT_ABSOLUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:[A-Za-z]:\\{1,2}|/)\S*?over_test_(test_[A-Za-z0-9_]+)_[^\\/\s]*\.png)")
        .expect("valid regex")
});
static SHOT_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(over_test_(test_[A-Za-z0-9_]+)_[^\\/\s]*\.png)").expect("valid regex")
});
static SHOT_REQUESTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"请求测试截图:\s*(\S+\.png)").expect("valid regex"));
static EMBEDDED_METHOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"over_test_(test_[A-Za-z0-9_]+)_").expect("valid regex"));

static STEP_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"步骤_(?:test_)?step_([0-9]+)_").expect("valid regex"));
static OVER_STEP_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"over_test_(?:test_)?step_([0-9]+)_").expect("valid regex"));

static CONCURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"开始并发执行\s*([0-9]+)\s*个独立浏览器实例").expect("valid regex")
});

// ============================================================================
// Method tags and phase markers
// ============================================================================

/// The first `[test_...]` method tag on the line
#[must_use]
pub fn method_tag(line: &str) -> Option<&str> {
    METHOD_TAG_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether the line is a method announcing its own completion
///
/// The tag and the repeated name must be the same method.
#[must_use]
pub fn is_completion(line: &str) -> bool {
    COMPLETION_RE
        .captures_iter(line)
        .any(|caps| caps.get(1).map(|m| m.as_str()) == caps.get(2).map(|m| m.as_str()))
}

/// Browser instance count declared by the concurrency banner
#[must_use]
pub fn declared_method_count(line: &str) -> Option<usize> {
    CONCURRENCY_RE.captures(line)?.get(1)?.as_str().parse().ok()
}

// ============================================================================
// Step headers
// ============================================================================

/// A recognized step header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepHeader<'a> {
    /// Step number
    pub number: u32,
    /// Step name, trimmed
    pub name: &'a str,
}

/// Extractor for one step header form
pub type StepHeaderRule = fn(&str) -> Option<StepHeader<'_>>;

/// Step header forms, in priority order
pub const STEP_HEADER_RULES: &[StepHeaderRule] = &[bracketed_step_header, narrative_step_header];

fn header_from<'a>(re: &Regex, line: &'a str) -> Option<StepHeader<'a>> {
    let caps = re.captures(line)?;
    // Numbers too large for u32 are not headers.
    let number = caps.get(1)?.as_str().parse().ok()?;
    let name = caps.get(2).map_or("", |m| m.as_str().trim());
    Some(StepHeader { number, name })
}

/// `==== 测试步骤 N：name ====`, anchored at the start of the trimmed line
#[must_use]
pub fn bracketed_step_header(line: &str) -> Option<StepHeader<'_>> {
    header_from(&STEP_HEADER_BRACKETED_RE, line)
}

/// `开始测试步骤N name 的操作`, anywhere on the line
#[must_use]
pub fn narrative_step_header(line: &str) -> Option<StepHeader<'_>> {
    header_from(&STEP_HEADER_NARRATIVE_RE, line)
}

/// Try every header form in order
#[must_use]
pub fn step_header(line: &str) -> Option<StepHeader<'_>> {
    STEP_HEADER_RULES.iter().find_map(|rule| rule(line))
}

// ============================================================================
// Screenshots
// ============================================================================

/// A screenshot reference found on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenshotMatch<'a> {
    /// Which form matched
    pub source: ScreenshotSource,
    /// Owning method, from the tag or inferred from the file name
    pub method: Option<&'a str>,
    /// The `.png` path as written
    pub path: &'a str,
}

impl ScreenshotMatch<'_> {
    /// Whether the method came from a file name rather than a `[tag]`
    #[must_use]
    pub fn method_inferred(&self) -> bool {
        self.source != ScreenshotSource::Confirmed && self.method.is_some()
    }
}

/// One screenshot form: the source it reports and its extractor
#[derive(Debug, Clone, Copy)]
pub struct ScreenshotRule {
    /// Source recorded on a match
    pub source: ScreenshotSource,
    /// Returns `(method, path)` when the line has this form
    pub extract: fn(&str) -> Option<(Option<&str>, &str)>,
}

/// Screenshot forms, in priority order
pub const SCREENSHOT_RULES: &[ScreenshotRule] = &[
    ScreenshotRule {
        source: ScreenshotSource::Confirmed,
        extract: confirmed_screenshot,
    },
    ScreenshotRule {
        source: ScreenshotSource::AbsolutePath,
        extract: absolute_screenshot,
    },
    ScreenshotRule {
        source: ScreenshotSource::BarePath,
        extract: bare_screenshot,
    },
    ScreenshotRule {
        source: ScreenshotSource::Requested,
        extract: requested_screenshot,
    },
];

fn confirmed_screenshot(line: &str) -> Option<(Option<&str>, &str)> {
    let caps = SHOT_CONFIRMED_RE.captures(line)?;
    Some((caps.get(1).map(|m| m.as_str()), caps.get(2)?.as_str()))
}

fn absolute_screenshot(line: &str) -> Option<(Option<&str>, &str)> {
    let caps = SHOT_ABSOLUTE_RE.captures(line)?;
    Some((caps.get(2).map(|m| m.as_str()), caps.get(1)?.as_str()))
}

fn bare_screenshot(line: &str) -> Option<(Option<&str>, &str)> {
    let caps = SHOT_BARE_RE.captures(line)?;
    Some((caps.get(2).map(|m| m.as_str()), caps.get(1)?.as_str()))
}

fn requested_screenshot(line: &str) -> Option<(Option<&str>, &str)> {
    let path = SHOT_REQUESTED_RE.captures(line)?.get(1)?.as_str();
    Some((embedded_method(path), path))
}

/// Method name embedded in an `over_test_<method>_...` file name
#[must_use]
pub fn embedded_method(path: &str) -> Option<&str> {
    EMBEDDED_METHOD_RE
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Evaluate the screenshot forms in order; the first match wins
#[must_use]
pub fn match_screenshot(line: &str) -> Option<ScreenshotMatch<'_>> {
    SCREENSHOT_RULES.iter().find_map(|rule| {
        (rule.extract)(line).map(|(method, path)| ScreenshotMatch {
            source: rule.source,
            method,
            path,
        })
    })
}

/// Step number embedded in a screenshot line or path
#[must_use]
pub fn step_hint(line: &str) -> Option<u32> {
    STEP_HINT_RE
        .captures(line)
        .or_else(|| OVER_STEP_HINT_RE.captures(line))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_method_tag() {
        assert_eq!(method_tag("[test_a] 点击登录按钮"), Some("test_a"));
        assert_eq!(
            method_tag("2024-01-01 10:00:00 - INFO - [test_SC_12] go"),
            Some("test_SC_12")
        );
        assert_eq!(method_tag("[helper] not a test method"), None);
        assert_eq!(method_tag("plain line"), None);
    }

    #[test]
    fn test_completion_requires_same_method() {
        assert!(is_completion("[test_a] test_a 完成"));
        assert!(is_completion("INFO [test_SC_1]  test_SC_1   完成 (3.2s)"));
        assert!(!is_completion("[test_a] test_b 完成"));
        assert!(!is_completion("[test_a] 完成"));
    }

    #[test]
    fn test_completion_ignores_prefix_of_longer_name() {
        assert!(!is_completion("[test_a] test_ab 完成"));
    }

    #[test]
    fn test_bracketed_step_header() {
        let header = step_header("==== 测试步骤 1：打开页面 ====").expect("header");
        assert_eq!(header.number, 1);
        assert_eq!(header.name, "打开页面");

        let header = step_header("=== 测试步骤12: 提交 表单 ===").expect("header");
        assert_eq!(header.number, 12);
        assert_eq!(header.name, "提交 表单");
    }

    #[test]
    fn test_bracketed_header_must_start_line() {
        assert!(bracketed_step_header("log: ==== 测试步骤 1：打开页面 ====").is_none());
    }

    #[test]
    fn test_narrative_step_header() {
        let header = step_header("[test_a] 开始测试步骤2 登录 的操作").expect("header");
        assert_eq!(header.number, 2);
        assert_eq!(header.name, "登录");
    }

    #[test]
    fn test_step_header_number_overflow_is_not_header() {
        assert!(step_header("==== 测试步骤 99999999999：x ====").is_none());
    }

    #[test]
    fn test_confirmed_screenshot() {
        let shot = match_screenshot("[test_a] 截图成功保存: over_test_test_a_001.png")
            .expect("screenshot");
        assert_eq!(shot.source, ScreenshotSource::Confirmed);
        assert_eq!(shot.method, Some("test_a"));
        assert_eq!(shot.path, "over_test_test_a_001.png");
        assert!(!shot.method_inferred());

        let shot = match_screenshot("[test_b] 页面 数据信息保存成功: /tmp/data.png").expect("shot");
        assert_eq!(shot.path, "/tmp/data.png");
    }

    #[test]
    fn test_absolute_screenshot_precedes_bare() {
        let shot = match_screenshot("saved /srv/img/over_test_test_login_2_step.png ok")
            .expect("screenshot");
        assert_eq!(shot.source, ScreenshotSource::AbsolutePath);
        assert_eq!(shot.path, "/srv/img/over_test_test_login_2_step.png");
        assert_eq!(shot.method, Some("test_login_2"));
        assert!(shot.method_inferred());

        let shot = match_screenshot(r"file C:\\logs\\over_test_test_x_1.png").expect("shot");
        assert_eq!(shot.source, ScreenshotSource::AbsolutePath);
        assert_eq!(shot.path, r"C:\\logs\\over_test_test_x_1.png");
    }

    #[test]
    fn test_bare_screenshot() {
        let shot = match_screenshot("wrote over_test_test_a_final.png").expect("shot");
        assert_eq!(shot.source, ScreenshotSource::BarePath);
        assert_eq!(shot.method, Some("test_a"));
    }

    #[test]
    fn test_requested_screenshot() {
        let shot = match_screenshot("请求测试截图: shots/home.png").expect("shot");
        assert_eq!(shot.source, ScreenshotSource::Requested);
        assert_eq!(shot.path, "shots/home.png");
        assert_eq!(shot.method, None);
    }

    #[test]
    fn test_no_screenshot() {
        assert!(match_screenshot("[test_a] clicked").is_none());
        assert!(match_screenshot("image.jpg saved").is_none());
    }

    #[test]
    fn test_step_hint() {
        assert_eq!(step_hint("保存 测试步骤_test_step_3_login.png"), Some(3));
        assert_eq!(step_hint("步骤_step_4_x.png"), Some(4));
        assert_eq!(step_hint("/a/over_test_step_7_b.png"), Some(7));
        assert_eq!(step_hint("over_test_test_a_1.png"), None);
    }

    #[test]
    fn test_declared_method_count() {
        assert_eq!(declared_method_count("开始并发执行 4 个独立浏览器实例"), Some(4));
        assert_eq!(declared_method_count("开始并发执行12个独立浏览器实例..."), Some(12));
        assert_eq!(declared_method_count("开始执行"), None);
    }
}
