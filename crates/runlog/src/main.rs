// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! runlog: structured reports from automated test execution logs
//!
//! Reads a raw execution log or a report payload, from a file or stdin, and
//! prints the segmented, formatted or grouped result as JSON on stdout.

use std::io::Write;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing::debug;

use runlog::config::Config;
use runlog::render;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    let Some(command) = config.command.clone() else {
        Config::command().print_help()?;
        return Ok(());
    };

    debug!(
        command = command.name(),
        image_root = %config.image_root().display(),
        "Starting runlog"
    );

    let output = render::run(&config, &command)
        .with_context(|| format!("runlog {} failed", command.name()))?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}").context("failed to write output")?;
    Ok(())
}
