// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report input types
//!
//! The payload handed over by the report backend: test cases keyed by
//! `<project_id>_<process_name>`, their executions with raw logs, and the
//! product selection the report was requested for.
//!
//! Deserialization is lenient. Missing or `null` fields become empty, and
//! scalar fields accept strings or numbers.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime};
use runlog_parser::{ParsedLog, segment};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::error::ReportError;
use crate::status::ExecutionStatus;

// ============================================================================
// Lenient field helpers
// ============================================================================

/// Any JSON scalar as text; `null` and missing become empty
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// Any JSON scalars as a list of text
fn lenient_text_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .collect())
}

/// Test cases in payload order
///
/// A test case that is `null` or not an object becomes an empty record; a
/// `report_data` that is not an object yields no test cases.
fn lenient_test_cases<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<(String, TestCaseRecord)>, D::Error> {
    let Some(Value::Object(entries)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .map(|(key, value)| {
            let record = if value.is_object() {
                serde_json::from_value(value)
                    .inspect_err(|err| warn!(key = %key, %err, "Unreadable test case"))
                    .unwrap_or_default()
            } else {
                TestCaseRecord::default()
            };
            (key, record)
        })
        .collect())
}

fn serialize_test_cases<S: Serializer>(
    test_cases: &[(String, TestCaseRecord)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(test_cases.iter().map(|(key, record)| (key, record)))
}

/// Object elements of an array; `null`, scalars and a non-array become nothing
fn lenient_objects<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Object values of a map; other values are dropped
fn lenient_object_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Object(entries)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter(|(_, value)| value.is_object())
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|v| (key, v)))
        .collect())
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

// ============================================================================
// Payload
// ============================================================================

/// A report request's full input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportPayload {
    /// Test cases keyed by `<project_id>_<process_name>`, in payload order
    #[serde(
        default,
        deserialize_with = "lenient_test_cases",
        serialize_with = "serialize_test_cases"
    )]
    pub report_data: Vec<(String, TestCaseRecord)>,
    /// Requested product selectors, usually `<package_name>|<product_id>`
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub selected_packages: Vec<String>,
    /// Product details per selector
    #[serde(default, deserialize_with = "lenient_object_map")]
    pub selected_products_info: BTreeMap<String, ProductInfo>,
    /// Requested date range, echoed back to the renderer
    #[serde(default, deserialize_with = "lenient_object")]
    pub date_range: Option<DateRange>,
}

impl ReportPayload {
    /// Parse a payload, accepting either the bare payload object or the
    /// backend's `{"success": .., "data": {..}}` envelope
    ///
    /// # Errors
    ///
    /// Returns `ReportError::JsonParse` for invalid JSON and
    /// `ReportError::InvalidPayload` when the top level is not an object.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let value: Value = serde_json::from_str(json)?;
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ReportError::InvalidPayload {
                    message: format!("expected a JSON object, found {}", kind_of(&other)),
                });
            }
        };

        if !object.contains_key("report_data") {
            if let Some(Value::Object(data)) = object.remove("data") {
                return Ok(serde_json::from_value(Value::Object(data))?);
            }
        }
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Find a test case by key
    #[must_use]
    pub fn test_case(&self, key: &str) -> Option<&TestCaseRecord> {
        self.report_data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, record)| record)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Product package details for one selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    /// Product package name
    #[serde(default, deserialize_with = "lenient_text")]
    pub package_name: String,
    /// Product identifier
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_id: String,
}

/// Requested report date range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day, as sent
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_date: String,
    /// Last day, as sent
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_date: String,
}

// ============================================================================
// Test cases and executions
// ============================================================================

/// One automation project (test case) and its executions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseRecord {
    /// Project identifier
    #[serde(default, deserialize_with = "lenient_text")]
    pub project_id: String,
    /// Process (test case) name
    #[serde(default, deserialize_with = "lenient_text")]
    pub process_name: String,
    /// Raw product identifier field: a JSON array, or free text with digits
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_ids: String,
    /// Raw product package names field
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_package_names: String,
    /// Product type tag
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_type: String,
    /// System under test
    #[serde(default, deserialize_with = "lenient_text")]
    pub system: String,
    /// Environment name
    #[serde(default, deserialize_with = "lenient_text")]
    pub environment: String,
    /// Product address (URL)
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_address: String,
    /// Executions, newest first as delivered
    #[serde(default, deserialize_with = "lenient_objects")]
    pub executions: Vec<ExecutionRecord>,
}

/// One execution of a test case
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Execution identifier
    #[serde(default, deserialize_with = "lenient_text")]
    pub execution_id: String,
    /// Raw status string
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    /// Start time, as sent
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_time: String,
    /// End time, as sent
    #[serde(default, deserialize_with = "lenient_text")]
    pub end_time: String,
    /// Who started the execution
    #[serde(default, deserialize_with = "lenient_text")]
    pub executed_by: String,
    /// Short log
    #[serde(default, deserialize_with = "lenient_text")]
    pub log_message: String,
    /// Full log, preferred over `log_message` when present
    #[serde(default, deserialize_with = "lenient_text")]
    pub detailed_log: String,
    #[serde(skip)]
    parsed: OnceLock<ParsedLog>,
}

impl ExecutionRecord {
    /// Create an execution with a status and a raw log
    #[must_use]
    pub fn new(status: impl Into<String>, log: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            detailed_log: log.into(),
            ..Default::default()
        }
    }

    /// Set the execution identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.execution_id = id.into();
        self
    }

    /// Set start and end times
    #[must_use]
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = start.into();
        self.end_time = end.into();
        self
    }

    /// Set the executor
    #[must_use]
    pub fn with_executor(mut self, executor: impl Into<String>) -> Self {
        self.executed_by = executor.into();
        self
    }

    /// The log to segment: `detailed_log` if non-empty, else `log_message`
    #[must_use]
    pub fn raw_log(&self) -> &str {
        if self.detailed_log.is_empty() {
            &self.log_message
        } else {
            &self.detailed_log
        }
    }

    /// Segmented log, computed on first access
    pub fn parsed_log(&self) -> &ParsedLog {
        self.parsed.get_or_init(|| segment(self.raw_log()))
    }

    /// Classified status
    #[must_use]
    pub fn status(&self) -> ExecutionStatus {
        ExecutionStatus::classify(&self.status)
    }

    /// Parsed start time
    #[must_use]
    pub fn started_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.start_time)
    }

    /// Parsed end time
    #[must_use]
    pub fn ended_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.end_time)
    }

    /// Identifier safe for use in renderer element ids
    ///
    /// Uses the execution id, else the start time, else `index`.
    #[must_use]
    pub fn key(&self, index: usize) -> String {
        let raw = [&self.execution_id, &self.start_time]
            .into_iter()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| index.to_string());
        raw.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a timestamp in any of the forms the backend emits
///
/// Accepts RFC 3339, RFC 2822 (`Mon, 01 Jan 2024 10:00:00 GMT`) and plain
/// `YYYY-MM-DD HH:MM:SS`. Offsets are normalized to UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
