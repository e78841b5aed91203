// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for runlog-report

use thiserror::Error;

/// Errors that can occur while loading report input
#[derive(Debug, Error)]
pub enum ReportError {
    /// Error parsing JSON
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Payload is valid JSON but not a report object
    #[error("Invalid report payload: {message}")]
    InvalidPayload {
        /// Description of what was found instead
        message: String,
    },
}
