// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Execution status classification

use serde::{Deserialize, Serialize};

/// Status class of an execution
///
/// Anything not recognized as success or running is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Execution passed
    Success,
    /// Execution failed, or reported a status we do not know
    Failed,
    /// Execution still in progress
    Running,
}

impl ExecutionStatus {
    /// Classify a raw status string
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "passed" | "成功" => Self::Success,
            "running" | "执行中" => Self::Running,
            _ => Self::Failed,
        }
    }

    /// Class name used by renderers
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Running => "running",
        }
    }
}

/// Display label for a raw status string
///
/// Known English statuses are translated; others are shown as sent.
#[must_use]
pub fn status_label(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "passed" => "成功".to_string(),
        "failed" => "失败".to_string(),
        "running" => "执行中".to_string(),
        "" => "未知".to_string(),
        _ => trimmed.to_string(),
    }
}

/// Execution counts per status class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTally {
    /// Successful executions
    pub success: usize,
    /// Failed executions
    pub failed: usize,
    /// Running executions
    pub running: usize,
}

impl StatusTally {
    /// Count one execution
    pub fn record(&mut self, status: ExecutionStatus) {
        match status {
            ExecutionStatus::Success => self.success += 1,
            ExecutionStatus::Failed => self.failed += 1,
            ExecutionStatus::Running => self.running += 1,
        }
    }

    /// Add another tally into this one
    pub fn merge(&mut self, other: Self) {
        self.success += other.success;
        self.failed += other.failed;
        self.running += other.running;
    }

    /// Total executions counted
    #[must_use]
    pub fn total(&self) -> usize {
        self.success + self.failed + self.running
    }
}

impl FromIterator<ExecutionStatus> for StatusTally {
    fn from_iter<I: IntoIterator<Item = ExecutionStatus>>(iter: I) -> Self {
        let mut tally = Self::default();
        for status in iter {
            tally.record(status);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_classify_known_statuses() {
        assert_eq!(ExecutionStatus::classify("passed"), ExecutionStatus::Success);
        assert_eq!(ExecutionStatus::classify("成功"), ExecutionStatus::Success);
        assert_eq!(ExecutionStatus::classify("failed"), ExecutionStatus::Failed);
        assert_eq!(ExecutionStatus::classify("失败"), ExecutionStatus::Failed);
        assert_eq!(ExecutionStatus::classify("running"), ExecutionStatus::Running);
        assert_eq!(ExecutionStatus::classify("执行中"), ExecutionStatus::Running);
        assert_eq!(ExecutionStatus::classify(" Passed "), ExecutionStatus::Success);
    }

    #[test]
    fn test_unknown_status_fails_closed() {
        assert_eq!(ExecutionStatus::classify("timeout"), ExecutionStatus::Failed);
        assert_eq!(ExecutionStatus::classify(""), ExecutionStatus::Failed);
        assert_eq!(ExecutionStatus::classify("unknown"), ExecutionStatus::Failed);
        assert_eq!(ExecutionStatus::classify("skipped"), ExecutionStatus::Failed);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label("passed"), "成功");
        assert_eq!(status_label("failed"), "失败");
        assert_eq!(status_label("running"), "执行中");
        assert_eq!(status_label("timeout"), "timeout");
        assert_eq!(status_label("  "), "未知");
    }

    #[test]
    fn test_tally() {
        let tally: StatusTally = ["passed", "failed", "timeout", "running", "passed"]
            .into_iter()
            .map(ExecutionStatus::classify)
            .collect();
        assert_eq!(tally.success, 2);
        assert_eq!(tally.failed, 2);
        assert_eq!(tally.running, 1);
        assert_eq!(tally.total(), 5);

        let mut sum = StatusTally::default();
        sum.merge(tally);
        sum.merge(tally);
        assert_eq!(sum.total(), 10);
    }

    #[test]
    fn test_status_serializes_as_class_name() {
        let json = serde_json::to_string(&ExecutionStatus::Success).expect("serialize");
        assert_eq!(json, format!("\"{}\"", ExecutionStatus::Success.as_str()));
    }
}
