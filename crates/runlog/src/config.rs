// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the runlog command line tool
//!
//! This module provides the command line options, the subcommands and the
//! settings derived from them: log level and screenshot image root.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use runlog_report::format::FormatOptions;

/// runlog - structured reports from automated test execution logs
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "runlog")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory screenshot display paths are resolved against
    ///
    /// Defaults to runlog/screenshots under the platform's local data
    /// directory.
    #[arg(long, env = "RUNLOG_IMAGE_ROOT", global = true)]
    pub image_root: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so the JSON on stdout stays clean.
    #[arg(short, long, default_value = "false", global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,

    /// Pretty-print the JSON output
    #[arg(long, default_value = "false", global = true)]
    pub pretty: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Segment one raw execution log and print the parsed log
    ///
    /// Reads FILE, or stdin when no file is given.
    Segment {
        /// Raw log file
        input: Option<PathBuf>,
    },

    /// Segment and format one raw execution log into phase blocks
    Format {
        /// Raw log file
        input: Option<PathBuf>,
    },

    /// Build a report from a report payload JSON
    ///
    /// Example:
    ///   curl -s "$BACKEND/report" | runlog report --pretty
    Report {
        /// Report payload file
        input: Option<PathBuf>,
    },
}

impl Command {
    /// Input file, when one was given
    #[must_use]
    pub fn input(&self) -> Option<&Path> {
        match self {
            Self::Segment { input } | Self::Format { input } | Self::Report { input } => {
                input.as_deref()
            }
        }
    }

    /// Subcommand name, for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Segment { .. } => "segment",
            Self::Format { .. } => "format",
            Self::Report { .. } => "report",
        }
    }
}

impl Config {
    /// Get the screenshot image root, using a default if not specified
    ///
    /// Default location is platform-specific:
    /// - macOS: ~/Library/Application Support/runlog/screenshots
    /// - Linux: ~/.local/share/runlog/screenshots
    /// - Windows: %LOCALAPPDATA%\runlog\screenshots
    #[must_use]
    pub fn image_root(&self) -> PathBuf {
        self.image_root.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("runlog")
                .join("screenshots")
        })
    }

    /// Formatter options for this configuration
    #[must_use]
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions::new(self.image_root().to_string_lossy())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the input path is given but doesn't exist or is
    /// not a regular file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(input) = self.command.as_ref().and_then(Command::input) {
            if !input.exists() {
                return Err(ConfigError::InputNotFound(input.to_path_buf()));
            }
            if !input.is_file() {
                return Err(ConfigError::InputNotFile(input.to_path_buf()));
            }
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is not a regular file
    #[error("Input path is not a file: {0}")]
    InputNotFile(PathBuf),
}
