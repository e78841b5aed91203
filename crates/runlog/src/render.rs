// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command rendering
//!
//! Each subcommand reads its input, runs it through the parser and report
//! crates and renders the result as JSON for an external renderer.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use runlog_parser::segment_bytes;
use runlog_report::ReportError;
use runlog_report::format::{FormatOptions, FormattedExecution, format_executions, format_log};
use runlog_report::hierarchy::{GroupReport, GroupSummary, ReportHierarchy, TestCaseReport};
use runlog_report::model::{DateRange, ReportPayload};
use runlog_report::status::StatusTally;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Command, Config, ConfigError};

/// Errors that can occur while running a command
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error reading input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing JSON output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Report payload could not be loaded
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// ============================================================================
// Report document
// ============================================================================

/// The rendered report handed to the renderer
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    /// When the report was built
    pub generated_at: DateTime<Utc>,
    /// Requested date range, echoed from the payload
    pub date_range: Option<DateRange>,
    /// Report-wide aggregates, summed over groups
    pub totals: ReportTotals,
    /// Product groups in selection order
    pub groups: Vec<GroupDocument>,
}

/// Report-wide aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    /// Number of groups
    pub group_count: usize,
    /// Test cases, counted once per group they appear in
    pub test_case_count: usize,
    /// Executions, counted once per group they appear in
    pub execution_count: usize,
    /// Executions by status class
    pub status: StatusTally,
}

/// One group with its formatted test cases
#[derive(Debug, Clone, Serialize)]
pub struct GroupDocument {
    /// Group aggregates
    #[serde(flatten)]
    pub summary: GroupSummary,
    /// Test cases in payload order
    pub test_cases: Vec<TestCaseDocument>,
}

/// One test case with its formatted executions
#[derive(Debug, Clone, Serialize)]
pub struct TestCaseDocument {
    /// Test case key
    pub key: String,
    /// Project identifier
    pub project_id: String,
    /// Process (test case) name
    pub process_name: String,
    /// Product type tag
    pub product_type: String,
    /// System under test
    pub system: String,
    /// Environment name
    pub environment: String,
    /// Product address
    pub product_address: String,
    /// Parsed product identifiers
    pub product_ids: Vec<String>,
    /// Executions by status class
    pub status: StatusTally,
    /// Formatted executions
    pub executions: Vec<FormattedExecution>,
}

impl TestCaseDocument {
    fn new(test_case: &TestCaseReport, options: &FormatOptions) -> Self {
        Self {
            key: test_case.key.clone(),
            project_id: test_case.project_id.clone(),
            process_name: test_case.process_name.clone(),
            product_type: test_case.product_type.clone(),
            system: test_case.system.clone(),
            environment: test_case.environment.clone(),
            product_address: test_case.product_address.clone(),
            product_ids: test_case.product_ids.clone(),
            status: test_case.status_tally(),
            executions: format_executions(&test_case.executions, options),
        }
    }
}

impl GroupDocument {
    fn new(group: &GroupReport, options: &FormatOptions) -> Self {
        Self {
            summary: group.summary(),
            test_cases: group
                .test_cases
                .iter()
                .map(|tc| TestCaseDocument::new(tc, options))
                .collect(),
        }
    }
}

impl ReportDocument {
    /// Build the document for a hierarchy
    #[must_use]
    pub fn build(
        hierarchy: &ReportHierarchy,
        date_range: Option<DateRange>,
        options: &FormatOptions,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let groups: Vec<GroupDocument> = hierarchy
            .groups()
            .iter()
            .map(|group| GroupDocument::new(group, options))
            .collect();

        Self {
            generated_at,
            date_range,
            totals: ReportTotals {
                group_count: groups.len(),
                test_case_count: hierarchy.test_case_count(),
                execution_count: hierarchy.execution_count(),
                status: hierarchy.status_tally(),
            },
            groups,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, RenderError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Render the parsed log of a raw log as JSON
///
/// # Errors
///
/// Returns `RenderError::Json` if serialization fails.
pub fn render_segment(raw: &[u8], pretty: bool) -> Result<String, RenderError> {
    let log = segment_bytes(raw);
    info!(
        steps = log.step_count,
        methods = log.method_count,
        screenshots = log.screenshots.len(),
        "Segmented log"
    );
    to_json(&log, pretty)
}

/// Render the formatted phase blocks of a raw log as JSON
///
/// # Errors
///
/// Returns `RenderError::Json` if serialization fails.
pub fn render_format(
    raw: &[u8],
    options: &FormatOptions,
    pretty: bool,
) -> Result<String, RenderError> {
    let log = segment_bytes(raw);
    let blocks = format_log(&log, options);
    info!(blocks = blocks.len(), "Formatted log");
    to_json(&blocks, pretty)
}

/// Render a report payload as a [`ReportDocument`] JSON
///
/// # Errors
///
/// Returns `RenderError::Report` if the payload cannot be parsed and
/// `RenderError::Json` if serialization fails.
pub fn render_report(
    input: &str,
    options: &FormatOptions,
    pretty: bool,
    generated_at: DateTime<Utc>,
) -> Result<String, RenderError> {
    let mut payload = ReportPayload::from_json(input)?;
    let date_range = payload.date_range.take();
    debug!(
        test_cases = payload.report_data.len(),
        selections = payload.selected_packages.len(),
        "Loaded report payload"
    );

    let hierarchy = ReportHierarchy::from_payload(payload);
    let document = ReportDocument::build(&hierarchy, date_range, options, generated_at);
    info!(
        groups = document.totals.group_count,
        test_cases = document.totals.test_case_count,
        executions = document.totals.execution_count,
        "Built report"
    );
    to_json(&document, pretty)
}

/// Read a command's input from a file, or stdin when there is none
///
/// # Errors
///
/// Returns `RenderError::Io` if the input cannot be read.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>, RenderError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Reading input file");
            Ok(std::fs::read(path)?)
        }
        None => {
            debug!("Reading input from stdin");
            let mut buf = Vec::new();
            std::io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Run one command against already-read input
///
/// # Errors
///
/// Returns an error if the command fails to load or render its input.
pub fn run_command(
    command: &Command,
    input: &[u8],
    config: &Config,
) -> Result<String, RenderError> {
    let options = config.format_options();
    match command {
        Command::Segment { .. } => render_segment(input, config.pretty),
        Command::Format { .. } => render_format(input, &options, config.pretty),
        Command::Report { .. } => {
            let text = String::from_utf8_lossy(input);
            render_report(&text, &options, config.pretty, Utc::now())
        }
    }
}

/// Validate the configuration, read the command's input and render it
///
/// # Errors
///
/// Returns an error if validation, reading or rendering fails.
pub fn run(config: &Config, command: &Command) -> Result<String, RenderError> {
    config.validate()?;
    let input = read_input(command.input())?;
    debug!(command = command.name(), bytes = input.len(), "Running command");
    run_command(command, &input, config)
}
